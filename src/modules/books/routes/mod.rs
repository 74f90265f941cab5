pub mod api;
pub mod pages;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
        Router,
    };
    use bookclub_kernel::settings::{CredentialSettings, SheetSettings, Settings};
    use bookclub_kernel::ModuleRegistry;
    use bookclub_sheets::{BookStore, Connection, MemoryStore, Row, StoreError};
    use tower::ServiceExt;

    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl BookStore for ReadOnlyStore {
        fn describe(&self) -> String {
            "read-only".to_string()
        }

        async fn fetch_rows(&self) -> Result<Vec<Row>, StoreError> {
            self.inner.fetch_rows().await
        }

        async fn append(&self, _: &str, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Api {
                status: 403,
                message: "The caller does not have permission".to_string(),
            })
        }

        async fn find_and_set_status(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Api {
                status: 403,
                message: "The caller does not have permission".to_string(),
            })
        }
    }

    fn app(connection: Connection) -> Router {
        let settings = Settings::default();
        let mut registry = ModuleRegistry::new();
        crate::modules::register_all(&mut registry, &settings, Arc::new(connection));
        bookclub_http::build_router(&registry, &settings)
    }

    fn dune_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_lines([["Dune", "Herbert", "Alice", "Available"]]))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn statuses(store: &MemoryStore) -> Vec<(String, String)> {
        store
            .list_all()
            .await
            .iter()
            .map(|row| {
                (
                    row.get("Title").unwrap_or_default().to_string(),
                    row.get("Status").unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn page_renders_table_and_forms() {
        let app = app(Connection::with_store(dune_store()));

        let response = get(app, "/?notice=saved").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text(response).await;
        assert!(html.contains("<td>Dune</td>"));
        assert!(html.contains("Saved!"));
        assert!(html.contains("No book of the month"));
        assert!(html.contains("action=\"/books/status\""));
    }

    #[tokio::test]
    async fn adding_a_book_appends_one_available_row() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response = post_form(app, "/books", "title=Hyperion&author=Simmons&owner=Bob").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=saved");

        let rows = store.list_all().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("Title"), Some("Hyperion"));
        assert_eq!(rows[1].get("Author"), Some("Simmons"));
        assert_eq!(rows[1].get("Owner"), Some("Bob"));
        assert_eq!(rows[1].get("Status"), Some("Available"));
    }

    #[tokio::test]
    async fn adding_without_title_is_a_no_op() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response = post_form(app, "/books", "title=&author=Simmons&owner=Bob").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(store.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn status_update_changes_only_that_book() {
        let store = Arc::new(MemoryStore::with_lines([
            ["Dune", "Herbert", "Alice", "Available"],
            ["Hyperion", "Simmons", "Bob", "Available"],
        ]));
        let app = app(Connection::with_store(store.clone()));

        let response =
            post_form(app.clone(), "/books/status", "title=Dune&status=Currently+Reading").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=updated");

        assert_eq!(
            statuses(&store).await,
            vec![
                ("Dune".to_string(), "Currently Reading".to_string()),
                ("Hyperion".to_string(), "Available".to_string()),
            ]
        );

        let html = text(get(app, "/").await).await;
        assert!(html.contains("Currently reading:</strong> Dune (Herbert)"));
    }

    #[tokio::test]
    async fn unknown_title_shows_error_without_mutation() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response = post_form(app, "/books/status", "title=Solaris&status=Lost").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text(response).await;
        assert!(html.contains("role=\"alert\">Error: no book titled &#39;Solaris&#39;"));
        assert!(html.contains("<td>Dune</td>"));
        assert_eq!(
            statuses(&store).await,
            vec![("Dune".to_string(), "Available".to_string())]
        );
    }

    #[tokio::test]
    async fn unknown_status_label_shows_error() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response = post_form(app, "/books/status", "title=Dune&status=Misplaced").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(text(response).await.contains("unknown status"));
        assert_eq!(
            statuses(&store).await,
            vec![("Dune".to_string(), "Available".to_string())]
        );
    }

    #[tokio::test]
    async fn rejected_write_is_reported_inline() {
        let store = Arc::new(ReadOnlyStore {
            inner: MemoryStore::with_lines([["Dune", "Herbert", "Alice", "Available"]]),
        });
        let app = app(Connection::with_store(store));

        let response = post_form(app, "/books", "title=Hyperion").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text(response).await;
        assert!(html.contains("Saving failed"));
        assert!(html.contains("The caller does not have permission"));
        assert!(html.contains("<td>Dune</td>"));
    }

    #[tokio::test]
    async fn connection_failure_halts_the_page() {
        let connection = Connection::new(
            SheetSettings::default(),
            CredentialSettings {
                file: "/nonexistent/bookclub/service_account.json".to_string(),
                gcp_json: None,
            },
        );
        let app = app(connection);

        let response = get(app.clone(), "/").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let html = text(response).await;
        assert!(html.contains("Connection error"));
        assert!(!html.contains("<form"));

        let response = get(app, "/api/books").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn api_lists_and_creates_books() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response = post_json(
            app.clone(),
            "/api/books",
            serde_json::json!({"title": "Hyperion", "author": "Simmons", "owner": "Bob"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: serde_json::Value =
            serde_json::from_str(&text(get(app, "/api/books").await).await).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["title"], "Hyperion");
        assert_eq!(body[1]["status"], "Available");
    }

    #[tokio::test]
    async fn api_rejects_blank_title() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response =
            post_json(app, "/api/books", serde_json::json!({"title": " ", "author": "X"})).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn api_status_update_and_missing_title() {
        let store = dune_store();
        let app = app(Connection::with_store(store.clone()));

        let response = post_json(
            app.clone(),
            "/api/books/status",
            serde_json::json!({"title": "Dune", "status": "Currently Reading"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let current: serde_json::Value =
            serde_json::from_str(&text(get(app.clone(), "/api/books/current").await).await)
                .unwrap();
        assert_eq!(current["current"]["title"], "Dune");

        let response = post_json(
            app,
            "/api/books/status",
            serde_json::json!({"title": "Solaris", "status": "Lost"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
