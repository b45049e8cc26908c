//! Customer datasets.
//!
//! Provides the built-in reference dataset and loading of customer
//! records from JSON files.

use crate::models::{Customer, CustomerField, Gender, MaritalStatus};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate customer id: {0}")]
    DuplicateId(String),
}

type Row = (&'static str, &'static str, &'static str, Gender, MaritalStatus, u32, u64);

const REFERENCE_ROWS: &[Row] = &[
    ("BU79786", "Andrew", "Dhaka", Gender::Female, MaritalStatus::Married, 36, 56274),
    ("QZ44356", "Anne", "Rajshahi", Gender::Female, MaritalStatus::Single, 31, 0),
    ("AI49188", "Anthony", "Khulna", Gender::Female, MaritalStatus::Married, 50, 48767),
    ("WW63253", "Barbara", "Barishal", Gender::Male, MaritalStatus::Married, 43, 0),
    ("HB64268", "Brian", "Mymensingh", Gender::Male, MaritalStatus::Single, 37, 43836),
    ("OC83172", "Bruce", "Sylhet", Gender::Female, MaritalStatus::Married, 38, 62902),
    ("XZ87318", "Carol", "Khulna", Gender::Female, MaritalStatus::Married, 36, 55350),
    ("CF85061", "Christine", "Barishal", Gender::Male, MaritalStatus::Single, 38, 0),
    ("DY87989", "Christopher", "Mymensingh", Gender::Male, MaritalStatus::Divorced, 30, 14072),
    ("BQ94931", "Craig", "Sylhet", Gender::Female, MaritalStatus::Married, 42, 28812),
    ("SX51350", "David", "Rangpur", Gender::Male, MaritalStatus::Single, 31, 0),
    ("VQ65197", "Diane", "Chattogram", Gender::Female, MaritalStatus::Married, 28, 0),
    ("DP39365", "Elizabeth", "Dhaka", Gender::Male, MaritalStatus::Married, 50, 77026),
    ("SJ95423", "Grant", "Rajshahi", Gender::Male, MaritalStatus::Married, 39, 99845),
    ("IL66569", "Gregory", "Khulna", Gender::Male, MaritalStatus::Single, 25, 83689),
    ("BW63560", "Heather", "Barishal", Gender::Female, MaritalStatus::Married, 35, 24599),
    ("FV94802", "Helen", "Mymensingh", Gender::Male, MaritalStatus::Married, 28, 25049),
    ("OE15005", "Ian", "Sylhet", Gender::Male, MaritalStatus::Married, 28, 28855),
    ("WC83389", "James", "Rangpur", Gender::Male, MaritalStatus::Married, 31, 51148),
    ("FL50705", "Janet", "Chattogram", Gender::Female, MaritalStatus::Married, 45, 66140),
    ("ZK25313", "Janice", "Dhaka", Gender::Male, MaritalStatus::Single, 39, 57749),
    ("SV62436", "Jennifer", "Rajshahi", Gender::Female, MaritalStatus::Divorced, 45, 13789),
    ("YH23384", "John", "Mymensingh", Gender::Male, MaritalStatus::Divorced, 35, 14072),
    ("TZ98966", "Judith", "Sylhet", Gender::Female, MaritalStatus::Single, 36, 0),
    ("HM55802", "Julie", "Rangpur", Gender::Female, MaritalStatus::Married, 46, 17870),
    ("FS42516", "Karen", "Chattogram", Gender::Male, MaritalStatus::Married, 40, 97541),
    ("US89481", "Kevin", "Dhaka", Gender::Female, MaritalStatus::Single, 33, 0),
    ("HO30839", "Linda", "Rajshahi", Gender::Female, MaritalStatus::Married, 47, 10511),
    ("GE62437", "Lorraine", "Khulna", Gender::Female, MaritalStatus::Single, 40, 86584),
    ("EJ77678", "Lynette", "Rangpur", Gender::Female, MaritalStatus::Married, 24, 75690),
    ("SV85652", "Margaret", "Chattogram", Gender::Male, MaritalStatus::Married, 36, 23158),
    ("UL64533", "Mark", "Dhaka", Gender::Male, MaritalStatus::Married, 35, 65999),
    ("PF41800", "Mary", "Rajshahi", Gender::Male, MaritalStatus::Married, 30, 0),
    ("AO98601", "Michael", "Khulna", Gender::Male, MaritalStatus::Married, 28, 54500),
    ("SK67821", "Pamela", "Barishal", Gender::Female, MaritalStatus::Married, 47, 37260),
    ("YV55495", "Patricia", "Mymensingh", Gender::Female, MaritalStatus::Married, 36, 68987),
    ("KY38074", "Paul", "Sylhet", Gender::Male, MaritalStatus::Married, 43, 42305),
    ("DM79012", "Peter", "Rangpur", Gender::Female, MaritalStatus::Married, 39, 65706),
    ("CM61827", "Philip", "Chattogram", Gender::Male, MaritalStatus::Single, 24, 0),
    ("WC35801", "Richard", "Khulna", Gender::Male, MaritalStatus::Divorced, 49, 53243),
    ("QG25316", "Robert", "Rangpur", Gender::Female, MaritalStatus::Married, 45, 0),
    ("MB98372", "Robyn", "Chattogram", Gender::Female, MaritalStatus::Single, 27, 50071),
    ("IL19217", "Sandra", "Dhaka", Gender::Female, MaritalStatus::Married, 34, 60021),
    ("SR38658", "Stephen", "Rajshahi", Gender::Male, MaritalStatus::Married, 25, 43244),
    ("DH41343", "Steven", "Mymensingh", Gender::Male, MaritalStatus::Married, 43, 92834),
    ("HG65722", "Susan", "Sylhet", Gender::Female, MaritalStatus::Married, 47, 10105),
    ("BU27331", "Suzanne", "Rangpur", Gender::Male, MaritalStatus::Single, 48, 0),
    ("XM45289", "Wayne", "Chattogram", Gender::Female, MaritalStatus::Single, 31, 23218),
    ("KP34198", "Wendy", "Khulna", Gender::Female, MaritalStatus::Married, 49, 0),
    ("WE95729", "William", "Sylhet", Gender::Female, MaritalStatus::Married, 35, 0),
];

/// Returns the built-in 50-record reference dataset.
pub fn reference_customers() -> Vec<Customer> {
    REFERENCE_ROWS
        .iter()
        .map(
            |&(id, name, division, gender, marital_status, age, income)| Customer {
                id: id.to_string(),
                name: name.to_string(),
                division: division.to_string(),
                gender,
                marital_status,
                age,
                income,
            },
        )
        .collect()
}

/// Load customers from a JSON array file.
pub fn load_customers(path: &Path) -> Result<Vec<Customer>, DataError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let customers: Vec<Customer> =
        serde_json::from_str(&content).map_err(|source| DataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    ensure_unique_ids(&customers)?;
    debug!("Loaded {} customers from {}", customers.len(), path.display());

    Ok(customers)
}

/// Verify that no two customers share an id.
pub fn ensure_unique_ids(customers: &[Customer]) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for customer in customers {
        if !seen.insert(customer.id.as_str()) {
            return Err(DataError::DuplicateId(customer.id.clone()));
        }
    }
    Ok(())
}

/// Distinct non-empty values of a field, in order of first occurrence.
pub fn unique_values(customers: &[Customer], field: CustomerField) -> Vec<String> {
    let mut seen = HashSet::new();
    customers
        .iter()
        .map(|c| c.field_value(field))
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reference_dataset_shape() {
        let customers = reference_customers();
        assert_eq!(customers.len(), 50);
        assert!(ensure_unique_ids(&customers).is_ok());
        assert!(customers.iter().all(|c| (18..=100).contains(&c.age)));
    }

    #[test]
    fn test_unique_divisions_in_first_seen_order() {
        let divisions = unique_values(&reference_customers(), CustomerField::Division);
        assert_eq!(
            divisions,
            vec![
                "Dhaka",
                "Rajshahi",
                "Khulna",
                "Barishal",
                "Mymensingh",
                "Sylhet",
                "Rangpur",
                "Chattogram"
            ]
        );
    }

    #[test]
    fn test_load_customers_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"A1","name":"Ann","division":"Dhaka","gender":"F","maritalStatus":"Single","age":29,"income":0}}]"#
        )
        .unwrap();

        let customers = load_customers(file.path()).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].marital_status, MaritalStatus::Single);
        assert!(!customers[0].has_income());
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"A1","name":"Ann","division":"Dhaka","gender":"F","maritalStatus":"Single","age":29,"income":0}},
                {{"id":"A1","name":"Bob","division":"Sylhet","gender":"M","maritalStatus":"Married","age":41,"income":100}}
            ]"#
        )
        .unwrap();

        let err = load_customers(file.path()).unwrap_err();
        assert!(matches!(err, DataError::DuplicateId(ref id) if id == "A1"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_customers(Path::new("/nonexistent/customers.json")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
