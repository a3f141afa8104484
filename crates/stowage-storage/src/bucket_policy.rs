//! Public-read bucket policy.
//!
//! A single `Allow` statement granting `s3:GetObject` to any principal on the three
//! category prefixes. Stored-object URLs only resolve publicly while this policy (or an
//! externally managed equivalent) is attached.

use serde::Serialize;
use serde_json::Value;
use stowage_core::UploadCategory;

const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyDocument {
    version: &'static str,
    statement: Vec<PolicyStatement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyStatement {
    sid: &'static str,
    effect: &'static str,
    action: Vec<&'static str>,
    principal: Principal,
    resource: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Principal {
    #[serde(rename = "AWS")]
    aws: Vec<&'static str>,
}

/// Resource ARNs that must be publicly readable, one per category prefix.
pub fn public_read_resources(bucket: &str) -> Vec<String> {
    UploadCategory::ALL
        .iter()
        .map(|c| format!("arn:aws:s3:::{}/*/{}/*", bucket, c.path_segment()))
        .collect()
}

/// JSON policy document granting public read on every category prefix of `bucket`.
pub fn public_read_policy(bucket: &str) -> String {
    let document = PolicyDocument {
        version: POLICY_VERSION,
        statement: vec![PolicyStatement {
            sid: "PublicAccess",
            effect: "Allow",
            action: vec!["s3:GetObject"],
            principal: Principal { aws: vec!["*"] },
            resource: public_read_resources(bucket),
        }],
    };
    // Serializing plain strings and vectors cannot fail.
    serde_json::to_string(&document).unwrap_or_default()
}

fn as_strings(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn is_public_principal(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s == "*",
        Some(Value::Object(map)) => as_strings(map.get("AWS")).contains(&"*"),
        _ => false,
    }
}

/// Report the category prefixes an existing policy document does not make publicly
/// readable. An unparsable document misses all of them.
pub fn missing_public_read(document: &str, bucket: &str) -> Vec<String> {
    let required = public_read_resources(bucket);
    let Ok(parsed) = serde_json::from_str::<Value>(document) else {
        return required;
    };

    let statements: Vec<&Value> = match parsed.get("Statement") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) if single.is_object() => vec![single],
        _ => Vec::new(),
    };

    let granted: Vec<&str> = statements
        .into_iter()
        .filter(|s| s.get("Effect").and_then(Value::as_str) == Some("Allow"))
        .filter(|s| {
            as_strings(s.get("Action"))
                .iter()
                .any(|a| *a == "s3:GetObject" || *a == "s3:*")
        })
        .filter(|s| is_public_principal(s.get("Principal")))
        .flat_map(|s| as_strings(s.get("Resource")))
        .collect();

    let bucket_wide = format!("arn:aws:s3:::{}/*", bucket);
    required
        .into_iter()
        .filter(|r| {
            !granted
                .iter()
                .any(|g| *g == r.as_str() || *g == bucket_wide.as_str())
        })
        .collect()
}
