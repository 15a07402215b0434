use std::path::Path;

use async_trait::async_trait;
use google_sheets4::api::{Scope, ValueRange};
use google_sheets4::{hyper_rustls, hyper_util, yup_oauth2, Sheets};

use super::leads::{LeadRow, LeadStore, StoreError};

/// HTTPS connector used by the service-account client.
pub type SheetsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;

/// Appends lead rows to a Google Sheets tab through the generated
/// google-sheets4 client.
pub struct GoogleSheetsLeadStore<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    hub: Sheets<C>,
    spreadsheet_id: String,
    sheet_name: String,
}

impl<C> GoogleSheetsLeadStore<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Sheets<C>, spreadsheet_id: String, sheet_name: String) -> Self {
        Self {
            hub,
            spreadsheet_id,
            sheet_name,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn range(&self) -> String {
        sheet_range(&self.sheet_name)
    }

    fn map_error<E: std::fmt::Display>(err: E) -> StoreError {
        StoreError::Backend(err.to_string())
    }
}

/// Cells are stored as literal text so respondent input is never parsed as a formula.
const VALUE_INPUT_OPTION: &str = "RAW";
const INSERT_DATA_OPTION: &str = "INSERT_ROWS";

fn sheet_range(sheet_name: &str) -> String {
    format!("'{}'!A1", sheet_name.replace('\'', "''"))
}

impl GoogleSheetsLeadStore<SheetsConnector> {
    /// Authenticate once with a service-account key and build the store.
    pub async fn connect(
        service_account_key: &Path,
        spreadsheet_id: String,
        sheet_name: String,
    ) -> Result<Self, StoreError> {
        let key = yup_oauth2::read_service_account_key(service_account_key)
            .await
            .map_err(|err| StoreError::Credentials(err.to_string()))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?
            .https_or_http()
            .enable_http2()
            .build();

        let auth_client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build::<_, String>(connector.clone());
        let auth = yup_oauth2::ServiceAccountAuthenticator::with_client(key, auth_client)
        .build()
        .await
        .map_err(|err| StoreError::Credentials(err.to_string()))?;

        let client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(connector);
        let hub = Sheets::new(client, auth);

        Ok(Self::new(hub, spreadsheet_id, sheet_name))
    }
}

impl<C> std::fmt::Debug for GoogleSheetsLeadStore<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsLeadStore")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C> LeadStore for GoogleSheetsLeadStore<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    async fn append_row(&self, row: LeadRow) -> Result<(), StoreError> {
        let request = ValueRange {
            values: Some(vec![row.to_json_values()]),
            ..ValueRange::default()
        };

        let range = self.range();
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_append(request, &self.spreadsheet_id, &range)
            .value_input_option(VALUE_INPUT_OPTION)
            .insert_data_option(INSERT_DATA_OPTION)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(GoogleSheetsLeadStore::<C>::map_error)?;

        tracing::debug!(
            spreadsheet = %self.spreadsheet_id,
            updated_range = %response
                .updates
                .and_then(|updates| updates.updated_range)
                .unwrap_or_default(),
            kind = ?row.kind,
            "lead row appended to sheet"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::domain::Identity;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use hyper_util::client::legacy::connect::HttpConnector;

    fn plain_http_store(base_url: String) -> GoogleSheetsLeadStore<HttpConnector> {
        let client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(HttpConnector::new());
        let mut hub = Sheets::new(client, google_sheets4::common::NoToken);
        hub.base_url(base_url);
        GoogleSheetsLeadStore::new(hub, "sheet-id".to_string(), "Leads".to_string())
    }

    #[test]
    fn range_quotes_sheet_names() {
        assert_eq!(sheet_range("Data Maturity Leads"), "'Data Maturity Leads'!A1");
        assert_eq!(sheet_range("Ada's leads"), "'Ada''s leads'!A1");
    }

    #[tokio::test]
    async fn appends_formula_like_input_as_raw_text() {
        let server = MockServer::start().await;
        let formula = "=HYPERLINK(\"https://attacker.example\",\"click\")";
        Mock::given(method("POST"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-id/values/.+:append$"))
            .and(query_param("valueInputOption", "RAW"))
            .and(query_param("insertDataOption", "INSERT_ROWS"))
            .and(body_partial_json(json!({ "values": [[formula]] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "sheet-id",
                "updates": { "updatedRange": "Leads!A2:D2", "updatedRows": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = plain_http_store(format!("{}/", server.uri()));
        let identity = Identity::new(formula, "ada@example.com", "Manufacturing", "£1m-£5m");
        store
            .append_row(LeadRow::intake(&identity))
            .await
            .expect("append accepted");
    }
}
