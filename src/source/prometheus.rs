//! Prometheus instant-query binding for a signal source.

use super::{FetchError, SignalSource};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Polls a single instant vector query against a Prometheus-compatible
/// backend and yields the first sample's value.
pub struct PrometheusSource {
    client: Client,
    endpoint: String,
    query: String,
}

impl PrometheusSource {
    /// `timeout` bounds the whole request; the engine treats an expired
    /// budget as a fetch failure and holds the accumulator.
    pub fn new(base_url: &str, query: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: format!("{}/api/v1/query", base_url.trim_end_matches('/')),
            query: query.into(),
        }
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    data: QueryData,
}

#[derive(Deserialize)]
struct QueryData {
    result: Vec<QuerySample>,
}

#[derive(Deserialize)]
struct QuerySample {
    // Instant vector sample: [unix_timestamp, "value"]
    value: (f64, String),
}

/// Extract and validate the scalar from a query response body.
fn reading_from_response(body: QueryResponse) -> Result<f64, FetchError> {
    let sample = body.data.result.into_iter().next().ok_or(FetchError::Empty)?;
    let raw = sample.value.1;
    let value: f64 = raw
        .parse()
        .map_err(|_| FetchError::Parse(raw.clone()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(FetchError::Parse(raw));
    }
    Ok(value)
}

#[async_trait::async_trait]
impl SignalSource for PrometheusSource {
    async fn fetch(&self) -> Result<f64, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", self.query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::BadStatus(response.status()));
        }

        let body: QueryResponse = response.json().await?;
        reading_from_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> QueryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_instant_vector_sample() {
        let body = response(
            r#"{"status":"success","data":{"resultType":"vector","result":
                [{"metric":{"__name__":"energy_price_anomaly_count"},
                  "value":[1700000000.123,"3"]}]}}"#,
        );
        assert_eq!(reading_from_response(body).unwrap(), 3.0);
    }

    #[test]
    fn empty_result_is_a_fetch_error() {
        let body = response(r#"{"status":"success","data":{"result":[]}}"#);
        assert!(matches!(
            reading_from_response(body),
            Err(FetchError::Empty)
        ));
    }

    #[test]
    fn rejects_unparsable_value() {
        let body = response(
            r#"{"status":"success","data":{"result":[{"value":[0,"NaN-ish"]}]}}"#,
        );
        assert!(matches!(
            reading_from_response(body),
            Err(FetchError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn fetch_respects_configured_timeout() {
        // A server that accepts connections but never responds
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let _hold = socket;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });

        let source = PrometheusSource::new(
            &format!("http://{addr}"),
            "energy_price_anomaly_count",
            Duration::from_millis(200),
        );
        let start = std::time::Instant::now();
        let result = source.fetch().await;
        assert!(matches!(result, Err(FetchError::Http(_))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn rejects_negative_and_nonfinite_values() {
        for raw in ["-1", "NaN", "Inf"] {
            let json = format!(
                r#"{{"status":"success","data":{{"result":[{{"value":[0,"{raw}"]}}]}}}}"#
            );
            let body = response(&json);
            assert!(
                matches!(reading_from_response(body), Err(FetchError::Parse(_))),
                "raw={raw}"
            );
        }
    }
}
