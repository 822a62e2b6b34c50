//! Source enumeration: find the fact files a run will read.

use opendal::{ErrorKind, Operator};

use crate::error::{JobError, Result};

/// List every object below `prefix` whose key ends in `suffix`.
///
/// Keys come back sorted. No matching object is [`JobError::NotFound`].
pub async fn list_sources(op: &Operator, prefix: &str, suffix: &str) -> Result<Vec<String>> {
    let list_path = if prefix.is_empty() { "/" } else { prefix };

    let entries = match op.list_with(list_path).recursive(true).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(JobError::storage("list", list_path, e)),
    };

    let mut paths: Vec<String> = entries
        .into_iter()
        .filter(|entry| entry.metadata().is_file() && entry.path().ends_with(suffix))
        .map(|entry| entry.path().to_string())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(JobError::NotFound {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        });
    }

    tracing::info!(count = paths.len(), prefix, "Found source files");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendal::services;

    fn memory_operator() -> Operator {
        Operator::new(services::Memory::default())
            .expect("Failed to create memory operator")
            .finish()
    }

    #[tokio::test]
    async fn filters_by_suffix_and_sorts() {
        let op = memory_operator();
        for path in [
            "fact_rental/part-2.parquet",
            "fact_rental/part-1.parquet",
            "fact_rental/_SUCCESS",
            "fact_rental/2005/part-3.parquet",
            "other/part-9.parquet",
        ] {
            op.write(path, b"x".to_vec()).await.unwrap();
        }

        let paths = list_sources(&op, "fact_rental/", ".parquet").await.unwrap();
        assert_eq!(
            paths,
            vec![
                "fact_rental/2005/part-3.parquet",
                "fact_rental/part-1.parquet",
                "fact_rental/part-2.parquet",
            ]
        );
    }

    #[tokio::test]
    async fn empty_prefix_is_not_found() {
        let op = memory_operator();
        op.write("fact_rental/readme.txt", b"x".to_vec())
            .await
            .unwrap();

        let err = list_sources(&op, "fact_rental/", ".parquet")
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::NotFound { .. }));

        let err = list_sources(&op, "missing/", ".parquet").await.unwrap_err();
        assert!(matches!(err, JobError::NotFound { .. }));
    }
}
