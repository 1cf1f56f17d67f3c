//! Static description of every console module: what its form sends, which
//! dropdowns it fills, how its grid is laid out and which row actions it offers.

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, ConsoleResult};

/// Backend service owning a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    User,
    Employee,
    Equipment,
    Project,
    Client,
}

/// Attachment category understood by the user service file endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Document,
    History,
    Project,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Document => "DOCUMENT",
            FileType::History => "HISTORY",
            FileType::Project => "PROJECT",
        }
    }
}

pub const STATUS_OPTIONS: &[&str] = &["NONE", "ACTIVE", "INACTIVE", "PENDING"];
pub const GENDER_OPTIONS: &[&str] = &["NONE", "MALE", "FEMALE"];
pub const MONTH_OPTIONS: &[&str] = &[
    "NONE",
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];
pub const OPERATION_OPTIONS: &[&str] = &["NONE", "ADD", "DEFECT", "REMOVE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; cleared to an empty string.
    Text,
    /// Password-like text: sent, never back-filled from a record.
    Secret,
    /// Dropdown filled from reference data; cleared to `NONE`.
    Select,
    /// Dropdown over a fixed enumeration; cleared to `NONE`.
    Choice(&'static [&'static str]),
    /// Sent as one value built from several inputs joined by `separator`.
    Composite {
        parts: &'static [&'static str],
        separator: &'static str,
    },
    /// Checkbox group; sent as `[{"id": ..}]`.
    Checklist,
    /// Stored file name, produced by the upload that precedes a save.
    Attachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    /// Whether the field is part of the save payload.
    pub sent: bool,
}

impl FieldSpec {
    const fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            sent: true,
        }
    }

    pub const fn text(key: &'static str) -> Self {
        Self::new(key, FieldKind::Text)
    }

    pub const fn secret(key: &'static str) -> Self {
        Self::new(key, FieldKind::Secret)
    }

    pub const fn select(key: &'static str) -> Self {
        Self::new(key, FieldKind::Select)
    }

    pub const fn choice(key: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(key, FieldKind::Choice(options))
    }

    pub const fn status() -> Self {
        Self::choice("status", STATUS_OPTIONS)
    }

    pub const fn composite(
        key: &'static str,
        parts: &'static [&'static str],
        separator: &'static str,
    ) -> Self {
        Self::new(key, FieldKind::Composite { parts, separator })
    }

    pub const fn checklist(key: &'static str) -> Self {
        Self::new(key, FieldKind::Checklist)
    }

    pub const fn attachment(key: &'static str) -> Self {
        Self::new(key, FieldKind::Attachment)
    }

    /// Shown on the page but kept out of the payload.
    pub const fn local(self) -> Self {
        Self {
            sent: false,
            ..self
        }
    }
}

/// Dropdown (or checkbox group) populated from a reference endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSpec {
    /// Form field whose options this list provides.
    pub target: &'static str,
    pub service: Service,
    /// Path under the service; `{field}` placeholders read the form.
    pub path: &'static str,
    pub value_field: &'static str,
    /// Joined with `" - "` to build the option label.
    pub label_fields: &'static [&'static str],
    /// Parent field; the list reloads whenever it changes.
    pub depends_on: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignSource {
    Field(&'static str),
    /// Sum of `field` over the objects of the `list` array.
    Sum {
        list: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub target: &'static str,
    pub source: AssignSource,
}

/// Single-record fetch that back-fills derived fields when `trigger` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSpec {
    pub trigger: &'static str,
    pub service: Service,
    pub path: &'static str,
    pub assigns: &'static [Assignment],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowAction {
    Edit,
    Delete,
    /// Opens the stock ledger of the row.
    Ledger,
    PaySlip,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
            RowAction::Ledger => "Update Stock",
            RowAction::PaySlip => "Pay Slip",
        }
    }
}

/// Stock movement sub-form attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSpec {
    pub title: &'static str,
    /// Ledger field carrying the parent record id; survives a clear.
    pub parent: &'static str,
    pub service: Service,
    /// Resource receiving `saveUpdate`.
    pub resource: &'static str,
    pub list_path: &'static str,
    pub fields: &'static [FieldSpec],
    pub columns: &'static [&'static str],
    pub references: &'static [ReferenceSpec],
    pub lookups: &'static [LookupSpec],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSpec {
    pub key: &'static str,
    /// Page slug used by the gateway, e.g. `settings-equipment-type`.
    pub page: &'static str,
    pub service: Service,
    pub resource: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    pub columns: &'static [&'static str],
    pub references: &'static [ReferenceSpec],
    pub lookups: &'static [LookupSpec],
    pub attachment: Option<FileType>,
    pub ledger: Option<&'static LedgerSpec>,
    pub row_actions: &'static [RowAction],
}

impl ModuleSpec {
    pub fn path(&self, action: &str) -> String {
        format!("{}/{}", self.resource, action)
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}

const EDIT_DELETE: &[RowAction] = &[RowAction::Edit, RowAction::Delete];

const fn active(
    target: &'static str,
    service: Service,
    path: &'static str,
    label_fields: &'static [&'static str],
) -> ReferenceSpec {
    ReferenceSpec {
        target,
        service,
        path,
        value_field: "id",
        label_fields,
        depends_on: None,
    }
}

const fn copy(target: &'static str, field: &'static str) -> Assignment {
    Assignment {
        target,
        source: AssignSource::Field(field),
    }
}

const FINANCIAL_YEAR_REF: ReferenceSpec = active(
    "financialYearId",
    Service::Employee,
    "financialYear/getAllActive",
    &["financialYear"],
);

const EMPLOYEE_REF: ReferenceSpec = active(
    "employeeId",
    Service::Employee,
    "employee/getAllActive",
    &["fullName", "employeeNumber"],
);

const PROFILE_EMPLOYEE_REF: ReferenceSpec = ReferenceSpec {
    target: "employeeId",
    service: Service::Employee,
    path: "employeeProfile/getAllActiveByFinancialYear/{financialYearId}",
    value_field: "employeeId",
    label_fields: &["employeeFullName", "employee"],
    depends_on: Some("financialYearId"),
};

const EQUIPMENT_TYPE_REF: ReferenceSpec = active(
    "equipmentTypeId",
    Service::Equipment,
    "equipmentType/getAllActive",
    &["equipmentType"],
);

const EQUIPMENT_BY_TYPE_REF: ReferenceSpec = ReferenceSpec {
    target: "equipmentId",
    service: Service::Equipment,
    path: "equipment/getAllActiveByEquipmentType/{equipmentTypeId}",
    value_field: "id",
    label_fields: &["equipmentName"],
    depends_on: Some("equipmentTypeId"),
};

const fn simple_type(
    key: &'static str,
    page: &'static str,
    service: Service,
    resource: &'static str,
    title: &'static str,
    fields: &'static [FieldSpec],
    columns: &'static [&'static str],
) -> ModuleSpec {
    ModuleSpec {
        key,
        page,
        service,
        resource,
        title,
        fields,
        columns,
        references: &[],
        lookups: &[],
        attachment: None,
        ledger: None,
        row_actions: EDIT_DELETE,
    }
}

pub static USER_ROLE: ModuleSpec = simple_type(
    "user-role",
    "settings-user-role",
    Service::User,
    "userRole",
    "User Role Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("roleName"),
        FieldSpec::text("description"),
        FieldSpec::status(),
    ],
    &["roleName", "description", "status"],
);

pub static USER_ACCOUNT: ModuleSpec = ModuleSpec {
    references: &[active(
        "userRoleId",
        Service::User,
        "userRole/getAllActive",
        &["roleName"],
    )],
    ..simple_type(
        "user-account",
        "settings-user-account",
        Service::User,
        "userAccount",
        "User Account Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::text("userName"),
            FieldSpec::secret("password"),
            FieldSpec::secret("confirmPassword"),
            FieldSpec::select("userRoleId"),
            FieldSpec::status(),
        ],
        &["userName", "status"],
    )
};

pub static FINANCIAL_YEAR: ModuleSpec = simple_type(
    "financial-year",
    "settings-financial-year",
    Service::Employee,
    "financialYear",
    "Financial Year Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::composite("financialYear", &["financialYearName", "termName"], "-"),
        FieldSpec::text("startDate"),
        FieldSpec::text("endDate"),
        FieldSpec::status(),
    ],
    &["financialYear", "startDate", "endDate", "status"],
);

pub static ALLOWANCE_TYPE: ModuleSpec = simple_type(
    "allowance-type",
    "settings-allowance-type",
    Service::Employee,
    "allowanceType",
    "Allowance Type Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("allowanceType"),
        FieldSpec::text("description"),
        FieldSpec::text("allowancePay"),
        FieldSpec::status(),
    ],
    &["allowanceType", "description", "allowancePay", "status"],
);

pub static DOCUMENT_TYPE: ModuleSpec = simple_type(
    "document-type",
    "settings-document-type",
    Service::Employee,
    "documentType",
    "Document Type Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("documentType"),
        FieldSpec::text("description"),
        FieldSpec::status(),
    ],
    &["documentType", "description", "status"],
);

pub static EMPLOYEE_TYPE: ModuleSpec = simple_type(
    "employee-type",
    "settings-employee-type",
    Service::Employee,
    "employeeType",
    "Assignment Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("employeeType"),
        FieldSpec::text("description"),
        FieldSpec::text("basicPay"),
        FieldSpec::text("epf"),
        FieldSpec::text("epfCoContribution"),
        FieldSpec::text("totalEpf"),
        FieldSpec::text("etf"),
        FieldSpec::status(),
    ],
    &["employeeType", "description", "totalEpf", "etf", "status"],
);

pub static EQUIPMENT_TYPE: ModuleSpec = simple_type(
    "equipment-type",
    "settings-equipment-type",
    Service::Equipment,
    "equipmentType",
    "Equipment Type Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("equipmentType"),
        FieldSpec::text("description"),
        FieldSpec::status(),
    ],
    &["equipmentType", "description", "status"],
);

pub static PROJECT_TYPE: ModuleSpec = simple_type(
    "project-type",
    "settings-project-type",
    Service::Project,
    "projectType",
    "Project Type Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("projectType"),
        FieldSpec::text("description"),
        FieldSpec::status(),
    ],
    &["projectType", "description", "status"],
);

pub static EMPLOYEE: ModuleSpec = simple_type(
    "employee",
    "employee-employee",
    Service::Employee,
    "employee",
    "Employee Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("employeeNumber"),
        FieldSpec::text("nameWithInitials"),
        FieldSpec::text("firstName"),
        FieldSpec::text("lastName"),
        FieldSpec::text("fullName"),
        FieldSpec::text("dob"),
        FieldSpec::text("nic"),
        FieldSpec::text("joinDate"),
        FieldSpec::text("mobileNumber"),
        FieldSpec::text("homeNumber"),
        FieldSpec::text("homeAddress"),
        FieldSpec::choice("gender", GENDER_OPTIONS),
        FieldSpec::status(),
    ],
    &["employeeNumber", "fullName", "mobileNumber", "homeNumber", "status"],
);

pub static EMPLOYEE_PROFILE: ModuleSpec = ModuleSpec {
    references: &[
        FINANCIAL_YEAR_REF,
        EMPLOYEE_REF,
        active(
            "employeeTypeId",
            Service::Employee,
            "employeeType/getAllActive",
            &["employeeType"],
        ),
        active(
            "allowanceTypes",
            Service::Employee,
            "allowanceType/getAllActive",
            &["allowanceType"],
        ),
    ],
    ..simple_type(
        "employee-profile",
        "employee-profile",
        Service::Employee,
        "employeeProfile",
        "Employee Profile Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::select("financialYearId"),
            FieldSpec::select("employeeId"),
            FieldSpec::select("employeeTypeId"),
            FieldSpec::checklist("allowanceTypes"),
            FieldSpec::status(),
        ],
        &[
            "financialYear",
            "employee",
            "employeeFullName",
            "employeeType",
            "status",
        ],
    )
};

pub static EMPLOYEE_DOCUMENT: ModuleSpec = ModuleSpec {
    references: &[
        EMPLOYEE_REF,
        active(
            "documentTypeId",
            Service::Employee,
            "documentType/getAllActive",
            &["documentType"],
        ),
    ],
    attachment: Some(FileType::Document),
    ..simple_type(
        "employee-document",
        "employee-document",
        Service::Employee,
        "employeeDocument",
        "Employee Document Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::attachment("fileName"),
            FieldSpec::select("employeeId"),
            FieldSpec::select("documentTypeId"),
            FieldSpec::status(),
        ],
        &["employee", "employeeFullName", "documentType", "status"],
    )
};

pub static EMPLOYEE_HISTORY: ModuleSpec = ModuleSpec {
    references: &[FINANCIAL_YEAR_REF, PROFILE_EMPLOYEE_REF],
    attachment: Some(FileType::History),
    ..simple_type(
        "employee-history",
        "employee-history",
        Service::Employee,
        "employeeHistory",
        "Employee History Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::attachment("fileName"),
            FieldSpec::text("caption"),
            FieldSpec::text("reminder"),
            FieldSpec::select("financialYearId"),
            FieldSpec::select("employeeId"),
            FieldSpec::status(),
        ],
        &[
            "financialYear",
            "employee",
            "employeeFullName",
            "caption",
            "status",
        ],
    )
};

pub static EMPLOYEE_SALARY: ModuleSpec = ModuleSpec {
    references: &[FINANCIAL_YEAR_REF, PROFILE_EMPLOYEE_REF],
    lookups: &[
        LookupSpec {
            trigger: "employeeId",
            service: Service::Employee,
            path: "employeeProfile/getByEmployeeAndFinancialYear/{financialYearId}/{employeeId}",
            assigns: &[
                copy("employeeTypeId", "employeeTypeId"),
                Assignment {
                    target: "totalAllowance",
                    source: AssignSource::Sum {
                        list: "allowanceTypes",
                        field: "allowancePay",
                    },
                },
            ],
        },
        LookupSpec {
            trigger: "employeeTypeId",
            service: Service::Employee,
            path: "employeeType/getById/{employeeTypeId}",
            assigns: &[
                copy("basicPay", "basicPay"),
                copy("epf", "epf"),
                copy("epfCoContribution", "epfCoContribution"),
                copy("totalEpf", "totalEpf"),
                copy("etf", "etf"),
            ],
        },
    ],
    row_actions: &[RowAction::Edit, RowAction::PaySlip, RowAction::Delete],
    ..simple_type(
        "employee-salary",
        "employee-salary",
        Service::Employee,
        "employeeSalary",
        "Employee Salary Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::text("totalAllowance"),
            FieldSpec::text("totalOT"),
            FieldSpec::choice("salaryMonth", MONTH_OPTIONS),
            FieldSpec::select("financialYearId"),
            FieldSpec::select("employeeId"),
            FieldSpec::text("employeeTypeId").local(),
            FieldSpec::text("basicPay").local(),
            FieldSpec::text("epf").local(),
            FieldSpec::text("epfCoContribution").local(),
            FieldSpec::text("totalEpf").local(),
            FieldSpec::text("etf").local(),
        ],
        &[
            "financialYear",
            "employee",
            "employeeFullName",
            "salaryMonth",
            "totalAllowance",
            "totalOT",
        ],
    )
};

pub static CLIENT: ModuleSpec = simple_type(
    "client",
    "client-client",
    Service::Client,
    "client",
    "Client Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("firstName"),
        FieldSpec::text("lastName"),
        FieldSpec::text("fullName"),
        FieldSpec::text("nic"),
        FieldSpec::text("mobileNumber"),
        FieldSpec::text("landNumber"),
        FieldSpec::text("address"),
        FieldSpec::status(),
    ],
    &["fullName", "mobileNumber", "landNumber", "status"],
);

pub static EQUIPMENT: ModuleSpec = ModuleSpec {
    references: &[EQUIPMENT_TYPE_REF],
    ..simple_type(
        "equipment",
        "equipment-equipment",
        Service::Equipment,
        "equipment",
        "Equipment Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::text("equipmentNumber"),
            FieldSpec::text("equipmentName"),
            FieldSpec::select("equipmentTypeId"),
            FieldSpec::status(),
        ],
        &["equipmentType", "equipmentNumber", "equipmentName", "status"],
    )
};

pub static EQUIPMENT_SUPPLIER: ModuleSpec = simple_type(
    "equipment-supplier",
    "equipment-supplier",
    Service::Equipment,
    "equipmentSupplier",
    "Equipment Supplier Details",
    &[
        FieldSpec::text("id"),
        FieldSpec::text("supplierNumber"),
        FieldSpec::text("supplierName"),
        FieldSpec::text("mobileNumber"),
        FieldSpec::text("landNumber"),
        FieldSpec::text("address"),
        FieldSpec::status(),
    ],
    &[
        "supplierNumber",
        "supplierName",
        "mobileNumber",
        "landNumber",
        "status",
    ],
);

static EQUIPMENT_STOCK_LEDGER: LedgerSpec = LedgerSpec {
    title: "Equipment Stock History Details",
    parent: "equipmentStockId",
    service: Service::Equipment,
    resource: "equipmentStockHistory",
    list_path: "equipmentStockHistory/getAllByEquipmentStock/{equipmentStockId}",
    fields: &[
        FieldSpec::text("equipmentStockId"),
        FieldSpec::text("equipmentNumber").local(),
        FieldSpec::text("equipmentName").local(),
        FieldSpec::text("availableQuantity"),
        FieldSpec::choice("operation", OPERATION_OPTIONS),
        FieldSpec::text("equipmentQuantity"),
        FieldSpec::text("historyNote"),
    ],
    columns: &[
        "stockNumber",
        "operation",
        "equipmentQuantity",
        "historyNote",
        "date",
    ],
    references: &[],
    lookups: &[LookupSpec {
        trigger: "equipmentStockId",
        service: Service::Equipment,
        path: "equipmentStock/getById/{equipmentStockId}",
        assigns: &[
            copy("equipmentNumber", "equipmentNumber"),
            copy("equipmentName", "equipmentName"),
            copy("availableQuantity", "availableQuantity"),
        ],
    }],
};

pub static EQUIPMENT_STOCK: ModuleSpec = ModuleSpec {
    references: &[
        EQUIPMENT_TYPE_REF,
        EQUIPMENT_BY_TYPE_REF,
        active(
            "equipmentSupplierId",
            Service::Equipment,
            "equipmentSupplier/getAllActive",
            &["supplierName"],
        ),
    ],
    ledger: Some(&EQUIPMENT_STOCK_LEDGER),
    row_actions: &[RowAction::Edit, RowAction::Ledger, RowAction::Delete],
    ..simple_type(
        "equipment-stock",
        "equipment-stock",
        Service::Equipment,
        "equipmentStock",
        "Equipment Stock Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::text("stockNumber"),
            FieldSpec::text("purchasePrice"),
            FieldSpec::select("equipmentTypeId"),
            FieldSpec::select("equipmentId"),
            FieldSpec::select("equipmentSupplierId"),
            FieldSpec::status(),
        ],
        &["stockNumber", "equipmentNumber", "supplierName", "status"],
    )
};

pub static PROJECT: ModuleSpec = ModuleSpec {
    references: &[active(
        "projectTypeId",
        Service::Project,
        "projectType/getAllActive",
        &["projectType"],
    )],
    attachment: Some(FileType::Project),
    ..simple_type(
        "project",
        "project-project",
        Service::Project,
        "project",
        "Project Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::text("projectNumber"),
            FieldSpec::text("projectName"),
            FieldSpec::text("projectDetails"),
            FieldSpec::text("projectPrice"),
            FieldSpec::attachment("fileName"),
            FieldSpec::select("projectTypeId"),
            FieldSpec::status(),
        ],
        &[
            "projectType",
            "projectNumber",
            "projectName",
            "projectPrice",
            "status",
        ],
    )
};

static CLIENT_PROJECT_LEDGER: LedgerSpec = LedgerSpec {
    title: "Client Project Equipment Stock Details",
    parent: "clientProjectId",
    service: Service::Project,
    resource: "clientProjectStock",
    list_path: "clientProjectStock/getAllByClientProject/{clientProjectId}",
    fields: &[
        FieldSpec::text("clientProjectId"),
        FieldSpec::select("equipmentTypeId").local(),
        FieldSpec::select("equipmentId"),
        FieldSpec::text("equipmentStockId"),
        FieldSpec::text("availableQuantity"),
        FieldSpec::choice("operation", OPERATION_OPTIONS),
        FieldSpec::text("equipmentQuantity"),
        FieldSpec::text("stockNote"),
    ],
    columns: &[
        "projectNumber",
        "operation",
        "equipmentQuantity",
        "stockNote",
        "date",
    ],
    references: &[EQUIPMENT_TYPE_REF, EQUIPMENT_BY_TYPE_REF],
    lookups: &[LookupSpec {
        trigger: "equipmentId",
        service: Service::Equipment,
        path: "equipmentStock/getByEquipmentId/{equipmentId}",
        assigns: &[
            copy("equipmentStockId", "id"),
            copy("availableQuantity", "availableQuantity"),
        ],
    }],
};

pub static CLIENT_PROJECT: ModuleSpec = ModuleSpec {
    references: &[
        active(
            "projectId",
            Service::Project,
            "project/getAllActive",
            &["projectNumber"],
        ),
        active(
            "clientId",
            Service::Client,
            "client/getAllActive",
            &["fullName"],
        ),
    ],
    attachment: Some(FileType::Project),
    ledger: Some(&CLIENT_PROJECT_LEDGER),
    row_actions: &[RowAction::Edit, RowAction::Ledger, RowAction::Delete],
    ..simple_type(
        "client-project",
        "project-client",
        Service::Project,
        "clientProject",
        "Client Project Details",
        &[
            FieldSpec::text("id"),
            FieldSpec::text("projectNumber"),
            FieldSpec::text("projectDetails"),
            FieldSpec::text("projectStartDate"),
            FieldSpec::attachment("fileName"),
            FieldSpec::select("projectId"),
            FieldSpec::select("clientId"),
        ],
        &["projectNumber", "projectStartDate", "status"],
    )
};

pub static MODULES: &[&ModuleSpec] = &[
    &USER_ROLE,
    &USER_ACCOUNT,
    &FINANCIAL_YEAR,
    &EMPLOYEE_TYPE,
    &ALLOWANCE_TYPE,
    &DOCUMENT_TYPE,
    &EQUIPMENT_TYPE,
    &PROJECT_TYPE,
    &EMPLOYEE,
    &EMPLOYEE_PROFILE,
    &EMPLOYEE_DOCUMENT,
    &EMPLOYEE_HISTORY,
    &EMPLOYEE_SALARY,
    &EQUIPMENT,
    &EQUIPMENT_SUPPLIER,
    &EQUIPMENT_STOCK,
    &PROJECT,
    &CLIENT_PROJECT,
    &CLIENT,
];

/// Resolves a module by key (`equipment-type`) or page slug
/// (`settings-equipment-type`).
pub fn module(name: &str) -> ConsoleResult<&'static ModuleSpec> {
    let needle = name.trim().to_ascii_lowercase();
    MODULES
        .iter()
        .copied()
        .find(|spec| spec.key == needle || spec.page == needle)
        .ok_or_else(|| ConsoleError::UnknownModule(name.to_string()))
}

/// Fills `{field}` placeholders from `lookup`. Returns `None` as soon as a
/// placeholder has no usable value, so no request is built for it.
pub fn resolve_path<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> Option<String> {
    let mut out = String::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let end = rest[start..].find('}')? + start;
        out.push_str(&rest[..start]);
        let value = lookup(&rest[start + 1..end])?.trim();
        if crate::values::is_unset(value) {
            return None;
        }
        out.push_str(value);
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_module_has_unique_key_and_page() {
        let keys: HashSet<_> = MODULES.iter().map(|spec| spec.key).collect();
        let pages: HashSet<_> = MODULES.iter().map(|spec| spec.page).collect();
        assert_eq!(keys.len(), MODULES.len());
        assert_eq!(pages.len(), MODULES.len());
    }

    #[test]
    fn every_module_starts_with_id_and_offers_edit_and_delete() {
        for spec in MODULES {
            assert_eq!(spec.fields[0].key, "id", "{}", spec.key);
            assert!(spec.row_actions.contains(&RowAction::Edit), "{}", spec.key);
            assert!(spec.row_actions.contains(&RowAction::Delete), "{}", spec.key);
        }
    }

    #[test]
    fn references_and_lookups_point_at_declared_fields() {
        for spec in MODULES {
            for reference in spec.references {
                assert!(spec.field(reference.target).is_some(), "{} {}", spec.key, reference.target);
            }
            for lookup in spec.lookups {
                assert!(spec.field(lookup.trigger).is_some(), "{} {}", spec.key, lookup.trigger);
                for assignment in lookup.assigns {
                    assert!(spec.field(assignment.target).is_some(), "{} {}", spec.key, assignment.target);
                }
            }
        }
    }

    #[test]
    fn modules_resolve_by_key_or_page() {
        assert_eq!(module("equipment-type").expect("key").resource, "equipmentType");
        assert_eq!(module("settings-equipment-type").expect("page").key, "equipment-type");
        assert!(matches!(module("data-sync"), Err(ConsoleError::UnknownModule(_))));
    }

    #[test]
    fn path_templates_require_every_placeholder() {
        let values = [("financialYearId", "3"), ("employeeId", "NONE")];
        let lookup = |key: &str| values.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
        assert_eq!(
            resolve_path("employeeProfile/getAllActiveByFinancialYear/{financialYearId}", lookup),
            Some("employeeProfile/getAllActiveByFinancialYear/3".to_string())
        );
        assert_eq!(
            resolve_path("x/{financialYearId}/{employeeId}", lookup),
            None
        );
        assert_eq!(resolve_path("equipmentType/getAllActive", lookup).as_deref(), Some("equipmentType/getAllActive"));
    }
}
