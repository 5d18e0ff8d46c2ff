//! Integration tests for the table composition pipeline over an in-memory source.

use querytable_lib::Error;
use querytable_lib::config::TableConfig;
use querytable_lib::error::ConfigError;
use querytable_lib::error::FieldError;
use querytable_lib::error::FormatError;
use querytable_lib::format::Format;
use querytable_lib::format::FormatStep;
use querytable_lib::model::Record;
use querytable_lib::model::Value;
use querytable_lib::query::Direction;
use querytable_lib::query::Filter;
use querytable_lib::query::Page;
use querytable_lib::query::Query;
use querytable_lib::request::Request;
use querytable_lib::source::MemorySource;
use querytable_lib::source::QuerySource;
use querytable_lib::table::Table;

fn users() -> MemorySource {
    MemorySource::new(vec![
        Record::new()
            .set("id", 1i64)
            .set("name", "ann lee")
            .set("email", "ann@example.com")
            .set("status", "active")
            .set("created_at", "2024-01-05 08:00:00"),
        Record::new()
            .set("id", 2i64)
            .set("name", "bob stone")
            .set("email", "bob@example.com")
            .set("status", "archived")
            .set("created_at", "2024-02-10 09:15:00"),
        Record::new()
            .set("id", 3i64)
            .set("name", "joanne park")
            .set("email", "jo@example.com")
            .set("status", "active")
            .set("created_at", "2024-03-15 10:30:00"),
        Record::new()
            .set("id", 4i64)
            .set("name", "carl ann")
            .set("email", "carl@example.com")
            .set("status", "active")
            .set("created_at", "2024-04-20 11:45:00"),
    ])
}

fn orders(table: Table<MemorySource>) -> Vec<(String, Direction)> {
    table.apply().unwrap().query().order().fields().to_vec()
}

fn ids(rows: &[indexmap::IndexMap<String, Value>]) -> Vec<i64> {
    rows.iter().map(|row| row["id"].to_int()).collect()
}

// =============================================================================
// Column descriptors
// =============================================================================

#[test]
fn test_descriptors_follow_declaration_order() {
    let mut table = Table::new(users(), Request::new().with_sort("name:desc"));
    table.column("name").sortable(true);
    table.column("id").hide(true);
    table.column_as("email", "E-mail").searchable(true);
    table.hide_columns(["name"]);

    let payload = table.build().unwrap();
    let keys: Vec<_> = payload.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["name", "id", "email"]);
    assert_eq!(payload.columns[2].display, "E-mail");
    assert!(payload.columns[0].hidden);
    assert!(payload.columns[1].hidden);
}

#[test]
fn test_default_display_label() {
    let mut table = Table::new(users(), Request::new());
    table.column("created_at");
    let payload = table.build().unwrap();
    assert_eq!(payload.columns[0].display, "Created at");
}

#[test]
fn test_redeclared_column_keeps_position() {
    let mut table = Table::new(users(), Request::new());
    table.column("id").sortable(true);
    table.column("name");
    table.column("id");

    let keys: Vec<_> = table.columns().map(|c| c.key()).collect();
    assert_eq!(keys, ["id", "name"]);
    assert!(!table.get_column("id").unwrap().is_sortable());
}

// =============================================================================
// Visibility
// =============================================================================

#[test]
fn test_visible_and_hidden_lists_conflict() {
    let mut table = Table::new(users(), Request::new());
    table.column("id");
    table.column("name");
    table.visible_columns(["id"]).hide_columns(["name"]);

    let err = table.build().unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ConflictingVisibility)));
}

#[test]
fn test_visible_columns_unhide_listed_keys_only() {
    let mut table = Table::new(users(), Request::new());
    table.column("id").hide(true);
    table.column("name").hide(true);
    table.visible_columns(["id", "missing"]);

    let payload = table.build().unwrap();
    assert_eq!(payload.rows[0].keys().collect::<Vec<_>>(), ["id"]);
}

#[test]
fn test_hidden_column_never_rendered_but_still_filters_and_sorts() {
    let request = Request::new()
        .with_filter("status", "active")
        .with_sort("status:asc,id:desc");
    let mut table = Table::new(users(), request);
    table.column("id").sortable(true);
    table.column("status").searchable(true).sortable(true).hide(true);

    let payload = table.build().unwrap();
    assert_eq!(ids(&payload.rows), [4, 3, 1]);
    assert!(payload.rows.iter().all(|row| !row.contains_key("status")));
}

// =============================================================================
// Per-column filters and custom search
// =============================================================================

#[test]
fn test_column_filter_adds_contains_predicate() {
    let request = Request::new().with_filter("name", "ANN").with_filter("email", "x");
    let mut table = Table::new(users(), request);
    table.column("id");
    table.column("name").searchable(true);
    table.column("email");

    let prepared = table.apply().unwrap();
    assert_eq!(prepared.query().filters(), &[Filter::contains("name", "ANN")]);

    let payload = prepared.paginate().unwrap();
    assert_eq!(ids(&payload.rows), [1, 3, 4]);
}

#[test]
fn test_custom_search_suppresses_default_filter() {
    let request = Request::new().with_filter("status", "archived");
    let mut table = Table::new(users(), request);
    table.column("id");
    table
        .column("status")
        .searchable(true)
        .custom_search(|query, key| {
            query.filter(Filter::eq(key, "active"));
        });

    // Registered at declaration, before any apply step runs.
    assert_eq!(table.query().filters(), &[Filter::eq("status", "active")]);

    let prepared = table.apply().unwrap();
    assert_eq!(prepared.query().filters(), &[Filter::eq("status", "active")]);
    assert_eq!(ids(&prepared.paginate().unwrap().rows), [1, 3, 4]);
}

#[test]
fn test_with_query_scopes_every_page() {
    let mut table = Table::new(users(), Request::new());
    table.with_query(|query| {
        query.filter(Filter::ne("status", "archived"));
    });
    table.column("id");

    let payload = table.build().unwrap();
    assert_eq!(ids(&payload.rows), [1, 3, 4]);
}

// =============================================================================
// Global search
// =============================================================================

#[test]
fn test_global_search_is_one_or_group() {
    let mut table = Table::new(users(), Request::new().with_search("ann"));
    table.column("id");
    table.column("name").searchable(true);
    table.column("email").searchable(true).hide(true);

    let prepared = table.apply().unwrap();
    assert_eq!(
        prepared.query().filters(),
        &[Filter::or([
            Filter::contains("name", "ann"),
            Filter::contains("email", "ann"),
        ])]
    );
    assert_eq!(ids(&prepared.paginate().unwrap().rows), [1, 3, 4]);
}

#[test]
fn test_global_search_includes_custom_search_columns() {
    let mut table = Table::new(users(), Request::new().with_search("stone"));
    table.column("id");
    table.column("name").searchable(true).custom_search(|_, _| {});

    let payload = table.build().unwrap();
    assert_eq!(ids(&payload.rows), [2]);
}

#[test]
fn test_global_search_without_searchable_columns_is_noop() {
    let mut table = Table::new(users(), Request::new().with_search("ann"));
    table.column("id");
    table.column("name");

    let prepared = table.apply().unwrap();
    assert!(prepared.query().filters().is_empty());
    assert_eq!(prepared.paginate().unwrap().rows.len(), 4);
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_request_sort_wins_and_default_fills_gaps() {
    let mut table = Table::new(users(), Request::new().with_sort("name:desc"));
    table.column("name").sortable(true);
    table.column("id").sortable(true);
    table.default_sort(["name:asc", "id:asc"]);

    assert_eq!(
        orders(table),
        [
            ("name".to_string(), Direction::Desc),
            ("id".to_string(), Direction::Asc),
        ]
    );
}

#[test]
fn test_unsortable_and_unknown_keys_are_skipped() {
    let mut table = Table::new(users(), Request::new().with_sort("email:desc,nope,id:desc"));
    table.column("id").sortable(true);
    table.column("email");
    table.column("status");
    table.default_sort(["status:desc", "ghost"]);

    assert_eq!(orders(table), [("id".to_string(), Direction::Desc)]);
}

#[test]
fn test_default_sort_order_and_directions() {
    let mut table = Table::new(users(), Request::new());
    table.column("status").sortable(true);
    table.column("id").sortable(true);
    table
        .default_sort(["status:DESC"])
        .default_sort_by("id", Direction::Desc);

    let payload = table.build().unwrap();
    assert_eq!(ids(&payload.rows), [2, 4, 3, 1]);
    assert!(payload.meta.sort.is_empty());
}

#[test]
fn test_meta_echoes_request_sort_and_search() {
    let request = Request::new().with_sort("name:desc,unknown").with_search("a");
    let mut table = Table::new(users(), request);
    table.column("name").sortable(true).searchable(true);

    let payload = table.build().unwrap();
    let sort: Vec<_> = payload.meta.sort.into_iter().collect();
    assert_eq!(
        sort,
        [
            ("name".to_string(), Direction::Desc),
            ("unknown".to_string(), Direction::Asc),
        ]
    );
    assert_eq!(payload.meta.q.as_deref(), Some("a"));
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_request_limit_overrides_default_page_size() {
    let mut table = Table::new(users(), Request::new().with_limit(25));
    table.column("id");
    assert_eq!(table.apply().unwrap().page_size(), 25);

    let mut table = Table::new(users(), Request::new());
    table.column("id");
    assert_eq!(table.apply().unwrap().page_size(), 15);

    let mut table = Table::with_config(users(), Request::new(), &TableConfig::new().with_per_page(2));
    table.column("id");
    assert_eq!(table.apply().unwrap().page_size(), 2);

    let mut table = Table::new(users(), Request::new());
    table.column("id");
    table.per_page(3);
    assert_eq!(table.apply().unwrap().page_size(), 3);
}

#[test]
fn test_page_meta() {
    let request = Request::from_query_str("limit=3&page=2&sort=id");
    let mut table = Table::new(users(), request);
    table.column("id").sortable(true);

    let payload = table.build().unwrap();
    assert_eq!(ids(&payload.rows), [4]);
    assert_eq!(payload.meta.per_page, 3);
    assert_eq!(payload.meta.current_page, 2);
    assert_eq!(payload.meta.last_page, 2);
    assert_eq!(payload.meta.from, Some(4));
    assert_eq!(payload.meta.to, Some(4));
}

#[test]
fn test_empty_page_meta() {
    let mut table = Table::new(users(), Request::new().with_search("zzz"));
    table.column("name").searchable(true);

    let payload = table.build().unwrap();
    assert!(payload.rows.is_empty());
    assert_eq!(payload.meta.last_page, 1);
    assert_eq!(payload.meta.from, None);
    assert_eq!(payload.meta.to, None);
}

// =============================================================================
// Formatting
// =============================================================================

#[test]
fn test_format_pipeline_runs_in_order() {
    let mut table = Table::new(users(), Request::new().with_limit(1));
    table.column("name").with_format(["uppercase", "titlecase"]);

    let payload = table.build().unwrap();
    assert_eq!(payload.rows[0]["name"], Value::from("Ann Lee"));
}

#[test]
fn test_redeclared_format_replaces_previous_list() {
    let mut table = Table::new(users(), Request::new().with_limit(1));
    table
        .column("name")
        .with_format(["uppercase", "titlecase"])
        .format("uppercase");

    let payload = table.build().unwrap();
    assert_eq!(payload.rows[0]["name"], Value::from("ANN LEE"));
}

#[test]
fn test_custom_format_sees_full_row() {
    let mut table = Table::new(users(), Request::new().with_limit(1));
    table.column("id").hide(true);
    table.column("name").with_format([
        FormatStep::from(Format::Titlecase),
        FormatStep::custom(|row, value| {
            let id = row.get("id").map(Value::to_int).unwrap_or_default();
            Value::String(format!("#{} {}", id, value.to_text()))
        }),
    ]);

    let payload = table.build().unwrap();
    assert_eq!(payload.rows[0]["name"], Value::from("#1 Ann Lee"));
}

#[test]
fn test_unknown_format_is_identity() {
    let mut table = Table::new(users(), Request::new().with_limit(1));
    table.column("name").format("shout");

    let payload = table.build().unwrap();
    assert_eq!(payload.rows[0]["name"], Value::from("ann lee"));
}

#[test]
fn test_unparseable_date_aborts_build() {
    let mut table = Table::new(users(), Request::new());
    table.column("name").format(Format::Date);

    let err = table.build().unwrap_err();
    assert!(matches!(
        err,
        Error::Format(FormatError::InvalidDateTime { format: "date", .. })
    ));
}

// =============================================================================
// Format shorthand
// =============================================================================

#[test]
fn test_format_shorthand() {
    let mut table = Table::new(users(), Request::new().with_limit(1));
    table.call("date", &["created_at", "Joined"]).unwrap();
    table.call("uppercase", &["name"]).unwrap().searchable(true);

    let payload = table.build().unwrap();
    assert_eq!(payload.columns[0].display, "Joined");
    assert!(payload.columns[1].searchable);
    assert_eq!(payload.rows[0]["created_at"], Value::from("05/01/2024"));
    assert_eq!(payload.rows[0]["name"], Value::from("ANN LEE"));
}

#[test]
fn test_format_shorthand_reuses_existing_column() {
    let mut table = Table::new(users(), Request::new());
    table.column("name").sortable(true).format("lowercase");
    table.format_column(Format::Uppercase, "name", Some("ignored"));

    let column = table.get_column("name").unwrap();
    assert!(column.is_sortable());
    assert_eq!(column.display(), "Name");
    assert_eq!(column.format_steps().len(), 1);
}

#[test]
fn test_format_shorthand_errors() {
    let mut table = Table::new(users(), Request::new());

    let err = table.call("sparkle", &["name"]).err().unwrap();
    assert!(matches!(err, Error::Config(ConfigError::UnknownOperation(ref name)) if name == "sparkle"));

    let err = table.call("date", &[]).err().unwrap();
    assert!(matches!(
        err,
        Error::Config(ConfigError::ArgumentCount { count: 0, .. })
    ));

    let err = table.call("date", &["a", "b", "c"]).err().unwrap();
    assert!(matches!(
        err,
        Error::Config(ConfigError::ArgumentCount { count: 3, .. })
    ));
    assert_eq!(table.columns().count(), 0);
}

// =============================================================================
// Payload shape
// =============================================================================

#[test]
fn test_payload_json_shape() {
    let request = Request::from_query_str("sort=id:desc&limit=2&q=example");
    let mut table = Table::new(users(), request);
    table.column("id").sortable(true);
    table.column("email").searchable(true).hide(true);

    let json = table.build().unwrap().to_json().unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "meta": {
                "per_page": 2,
                "current_page": 1,
                "last_page": 2,
                "from": 1,
                "to": 2,
                "sort": {"id": "desc"},
                "q": "example",
            },
            "columns": [
                {"key": "id", "display": "Id", "sortable": true, "searchable": false, "hide": false},
                {"key": "email", "display": "Email", "sortable": false, "searchable": true, "hide": true},
            ],
            "rows": [{"id": 4}, {"id": 3}],
        })
    );
}

// =============================================================================
// Source failures
// =============================================================================

struct Offline;

impl QuerySource for Offline {
    fn paginate(&self, _query: &Query, _per_page: usize, _page: usize) -> Result<Page, Error> {
        Err(Error::source("connection refused"))
    }
}

#[test]
fn test_source_error_propagates() {
    let mut table = Table::new(Offline, Request::new());
    table.column("id");

    let err = table.build().unwrap_err();
    assert!(matches!(err, Error::Source(_)));
    assert_eq!(err.to_string(), "Source error: connection refused");
}

#[test]
fn test_failing_custom_format_aborts_build() {
    let mut table = Table::new(users(), Request::new());
    table.column("id");
    table.column("status").format(FormatStep::try_custom(|_row, value| {
        if value.as_str() == Some("archived") {
            Err("archived rows cannot be displayed")
        } else {
            Ok(value)
        }
    }));

    let err = table.build().unwrap_err();
    assert!(matches!(err, Error::Source(_)));
    assert_eq!(err.to_string(), "Source error: archived rows cannot be displayed");
}

#[test]
fn test_failing_custom_search_surfaces_at_declaration() {
    let mut table = Table::new(users(), Request::new());
    let err = table
        .column("status")
        .searchable(true)
        .try_custom_search(|_, key| Err(format!("{} is not indexed", key)))
        .err()
        .unwrap();

    assert!(matches!(err, Error::Source(_)));
    assert!(!table.get_column("status").unwrap().has_custom_search());
    assert!(table.query().is_empty());
}

#[test]
fn test_typed_read_in_custom_format_surfaces_field_error() {
    let mut table = Table::new(users(), Request::new().with_limit(1));
    table.column("name").format(FormatStep::try_custom(|row, value| {
        let tier = row.get_int("tier")?;
        Ok::<_, FieldError>(Value::String(format!("{} ({:?})", value.to_text(), tier)))
    }));

    let err = table.build().unwrap_err();
    let field_err = std::error::Error::source(&err)
        .and_then(|source| source.downcast_ref::<FieldError>())
        .unwrap();
    assert_eq!(field_err, &FieldError::missing("tier"));
    assert_eq!(field_err.field(), "tier");
}

#[test]
fn test_zero_is_a_real_search_term() {
    let request = Request::from_query_str("q=0&filter[email]=0");
    let mut table = Table::new(users(), request);
    table.column("name").searchable(true);
    table.column("email").searchable(true);

    let prepared = table.apply().unwrap();
    assert_eq!(
        prepared.query().filters(),
        &[
            Filter::contains("email", "0"),
            Filter::or([Filter::contains("name", "0"), Filter::contains("email", "0")]),
        ]
    );
}
