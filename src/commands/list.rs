use crate::commands::{plural, Out};
use crate::model::{Category, Record};
use crate::{Config, Result};

/// Lists every transaction of a category in sheet order. A transaction's position in this list is
/// its index for `update` and `delete`.
pub async fn list(config: &Config, category: &str) -> Result<Out<Vec<Record>>> {
    let category = Category::parse(category)?;
    let records = config.store().list(category).await?;
    let message = format!("Found {} in {category}", plural(records.len(), "transaction"));
    Ok(Out::new(message, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestEnv;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_empty_categories() {
        let env = TestEnv::new().await;
        for category in Category::ALL {
            let out = list(&env.config(), &category.to_string()).await.unwrap();
            assert!(out.structure().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_list_in_insert_order() {
        let env = TestEnv::new().await;
        env.insert("purchases", "first").await;
        env.insert("purchases", "second").await;
        env.insert("sales", "other").await;

        let out = list(&env.config(), "purchases").await.unwrap();
        assert_eq!(out.message(), "Found 2 transactions in purchases");
        let names: Vec<_> = out
            .structure()
            .unwrap()
            .iter()
            .map(|r| r.get("Name").cloned())
            .collect();
        assert_eq!(names, vec![Some(json!("first")), Some(json!("second"))]);
    }

    #[tokio::test]
    async fn test_list_invalid_category() {
        let env = TestEnv::new().await;
        let err = list(&env.config(), "refunds").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidCategory);
    }
}
