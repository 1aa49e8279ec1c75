use serde::de::DeserializeOwned;

use crate::runtime::error::Error;
use crate::runtime::task::AsyncTask;

impl AsyncTask<Vec<u8>> {
    /// Deserializes the JSON payload produced by this task.
    ///
    /// Decode failures are reported as [`Error::Deserialize`]; upstream
    /// failures pass through untouched.
    pub fn decode_json<T>(self) -> AsyncTask<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.try_map(|bytes: Vec<u8>| {
            serde_json::from_slice::<T>(&bytes).map_err(|e| Error::Deserialize(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Cat {
        name: String,
        cuteness: u8,
    }

    #[tokio::test]
    async fn decodes_payload() {
        let payload = br#"{"name":"tom","cuteness":9}"#.to_vec();
        let cat = AsyncTask::ready(payload).decode_json::<Cat>().await.unwrap();
        assert_eq!(
            cat,
            Cat {
                name: "tom".to_string(),
                cuteness: 9
            }
        );
    }

    #[tokio::test]
    async fn malformed_payload_is_a_deserialize_error() {
        let task = AsyncTask::ready(b"{not json".to_vec()).decode_json::<Cat>();
        assert!(matches!(task.await, Err(Error::Deserialize(_))));
    }
}
