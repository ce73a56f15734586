use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::warn;

use crate::glossary::seed::ALREADY_SEEDED_MESSAGE;
use crate::glossary::{self, Language, TranslationInput, WideTerm};
use crate::web::AppState;

use super::templates::{PAGE_STYLES, escape_html, render_footer};

/// Prefix of the add-form inputs that carry a translation, e.g. `tr_spanish`.
const TRANSLATION_FIELD_PREFIX: &str = "tr_";

#[derive(Default, Deserialize)]
pub struct PageQuery {
    pub language: Option<String>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    term_id: String,
}

pub async fn glossary_page(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Html<String> {
    let terms = glossary::list_wide(state.pool_ref()).await;
    let languages = glossary::list_languages(state.pool_ref()).await;

    let column = params
        .language
        .clone()
        .or_else(|| languages.iter().find(|l| l.is_primary).map(|l| l.key.clone()))
        .unwrap_or_default();
    let needle = params.q.clone().unwrap_or_default();
    let visible = glossary::filter_wide(&terms, &column, &needle);

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    Html(render_glossary_page(&languages, &visible, &column, &needle, &flash))
}

pub async fn create_term(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Redirect {
    let mut primary_term = String::new();
    let mut definition = String::new();
    let mut translations = Vec::new();

    for (name, value) in fields {
        match name.as_str() {
            "primary_term" => primary_term = value,
            "definition" => definition = value,
            other => {
                if let Some(key) = other.strip_prefix(TRANSLATION_FIELD_PREFIX) {
                    translations.push((key.to_string(), value));
                }
            }
        }
    }

    if primary_term.trim().is_empty() {
        return Redirect::to("/?error=missing_term");
    }

    let translations: TranslationInput = translations.into_iter().collect();
    let result = glossary::insert_entry(
        state.pool_ref(),
        &primary_term,
        definition.trim(),
        Some(&translations),
    )
    .await;

    if result.success {
        Redirect::to("/?status=created")
    } else {
        warn!(message = %result.message, "form submission failed");
        Redirect::to("/?error=create_failed")
    }
}

pub async fn delete_term(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let raw = glossary::RawTermId::Text(form.term_id);
    let result = glossary::delete_entry(state.pool_ref(), &raw).await;

    if result.success {
        Redirect::to("/?status=deleted")
    } else {
        Redirect::to("/?error=delete_failed")
    }
}

pub async fn seed_defaults(State(state): State<AppState>) -> Redirect {
    let result = glossary::seed_if_empty(state.pool_ref()).await;

    if result.success {
        Redirect::to("/?status=seeded")
    } else if result.message == ALREADY_SEEDED_MESSAGE {
        Redirect::to("/?error=already_seeded")
    } else {
        warn!(message = %result.message, "default data could not be added");
        Redirect::to("/?error=seed_failed")
    }
}

pub fn compose_flash_message(status: Option<&str>, error: Option<&str>) -> String {
    if let Some(status) = status {
        let message = match status {
            "created" => "Term added.",
            "deleted" => "Term deleted.",
            "seeded" => "Default data added.",
            _ => "",
        };

        if !message.is_empty() {
            return format!(r#"<div class="flash success">{message}</div>"#);
        }
    }

    if let Some(error) = error {
        let message = match error {
            "missing_term" => "Please enter the term in the primary language.",
            "create_failed" => "The term could not be saved. Check the logs for details.",
            "delete_failed" => "The term could not be deleted. It may have been removed already.",
            "already_seeded" => "The glossary already contains terms. Default data not added.",
            "seed_failed" => "Default data could not be added. Check the logs for details.",
            _ => "Something went wrong. Check the logs for details.",
        };

        return format!(r#"<div class="flash error">{message}</div>"#);
    }

    String::new()
}

pub fn render_glossary_page(
    languages: &[Language],
    terms: &[&WideTerm],
    column: &str,
    needle: &str,
    flash: &str,
) -> String {
    let header_cells: String = languages
        .iter()
        .map(|lang| format!("<th>{}</th>", escape_html(&lang.name)))
        .collect();

    let mut rows = String::new();
    if terms.is_empty() {
        rows.push_str(&format!(
            r#"<tr><td colspan="{span}" class="muted">No terms found.</td></tr>"#,
            span = languages.len() + 2
        ));
    }
    for term in terms {
        let cells: String = languages
            .iter()
            .map(|lang| match term.translations.get(&lang.key) {
                Some(text) => format!("<td>{}</td>", escape_html(text)),
                None => r#"<td class="muted">-</td>"#.to_string(),
            })
            .collect();
        rows.push_str(&format!(
            r#"<tr>
    {cells}
    <td>{definition}</td>
    <td>
        <form method="post" action="/glossary/delete" onsubmit="return confirm('Delete this term?');">
            <input type="hidden" name="term_id" value="{id}">
            <button type="submit" class="danger">Delete</button>
        </form>
    </td>
</tr>"#,
            cells = cells,
            definition = escape_html(&term.definition),
            id = term.term_id,
        ));
    }

    let column_options: String = languages
        .iter()
        .map(|lang| {
            let selected = if lang.key == column { " selected" } else { "" };
            format!(
                r#"<option value="{key}"{selected}>{name}</option>"#,
                key = escape_html(&lang.key),
                name = escape_html(&lang.name),
            )
        })
        .collect();

    let translation_fields: String = languages
        .iter()
        .filter(|lang| !lang.is_primary)
        .map(|lang| {
            format!(
                r#"<div class="field">
                    <label for="tr-{key}">{name} (optional)</label>
                    <input id="tr-{key}" name="{prefix}{key}">
                </div>"#,
                key = escape_html(&lang.key),
                name = escape_html(&lang.name),
                prefix = TRANSLATION_FIELD_PREFIX,
            )
        })
        .collect();

    let primary_name = languages
        .iter()
        .find(|lang| lang.is_primary)
        .map(|lang| escape_html(&lang.name))
        .unwrap_or_else(|| "Term".to_string());

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Glossary</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <h1>Glossary</h1>
        <p class="note">Terms in the primary language and their translations.</p>
    </header>
    <main>
        {flash}
        <section class="panel">
            <form method="get" action="/" class="toolbar">
                <div class="field">
                    <label for="filter-q">Filter</label>
                    <input id="filter-q" name="q" value="{needle}" placeholder="Search terms">
                </div>
                <div class="field">
                    <label for="filter-language">Column</label>
                    <select id="filter-language" name="language">{column_options}</select>
                </div>
                <div class="field"><button type="submit">Apply</button></div>
            </form>
            <table>
                <thead>
                    <tr>{header_cells}<th>Definition</th><th></th></tr>
                </thead>
                <tbody>
                    {rows}
                </tbody>
            </table>
        </section>
        <section class="panel">
            <h2>Add term</h2>
            <form method="post" action="/glossary">
                <div class="entry-form">
                    <div class="field">
                        <label for="primary-term">{primary_name}</label>
                        <input id="primary-term" name="primary_term" required>
                    </div>
                    <div class="field">
                        <label for="definition">Definition (optional)</label>
                        <input id="definition" name="definition">
                    </div>
                    {translation_fields}
                </div>
                <button type="submit">Save term</button>
            </form>
            <form method="post" action="/glossary/seed" class="toolbar">
                <button type="submit">Add default data</button>
            </form>
        </section>
        {footer}
    </main>
</body>
</html>"##,
        styles = PAGE_STYLES,
        flash = flash,
        needle = escape_html(needle),
        column_options = column_options,
        header_cells = header_cells,
        rows = rows,
        primary_name = primary_name,
        translation_fields = translation_fields,
        footer = render_footer(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;

    use super::*;
    use crate::db::Store;
    use crate::glossary::languages::ensure_defaults;
    use crate::glossary::store::count_terms;

    fn languages() -> Vec<Language> {
        vec![
            Language::new(1, "English", true),
            Language::new(2, "Spanish", false),
        ]
    }

    #[test]
    fn page_renders_columns_and_escapes_text() {
        let term = WideTerm {
            term_id: 7,
            definition: "<greeting>".to_string(),
            updated_at: chrono::Utc::now(),
            translations: BTreeMap::from([("english".to_string(), "Hello".to_string())]),
        };
        let html = render_glossary_page(&languages(), &[&term], "english", "he", "");

        assert!(html.contains("<th>English</th><th>Spanish</th>"));
        assert!(html.contains("<td>Hello</td>"));
        assert!(html.contains("&lt;greeting&gt;"));
        assert!(html.contains(r#"name="tr_spanish""#));
        assert!(!html.contains(r#"name="tr_english""#));
        assert!(html.contains(r#"value="7""#));
        assert!(html.contains(r#"action="/glossary/seed""#));
    }

    #[test]
    fn flash_prefers_status_and_falls_back_for_unknown_errors() {
        assert!(compose_flash_message(Some("created"), None).contains("success"));
        assert!(compose_flash_message(None, Some("bogus")).contains("Something went wrong"));
        assert!(compose_flash_message(None, None).is_empty());
    }

    #[test]
    fn flash_covers_seeding_outcomes() {
        assert!(compose_flash_message(Some("seeded"), None).contains("Default data added."));
        let already = compose_flash_message(None, Some("already_seeded"));
        assert!(already.contains("flash error"));
        assert!(already.contains("already contains terms"));
    }

    #[tokio::test]
    async fn seed_button_adds_defaults_once() {
        let store = Store::in_memory().await.expect("store");
        let state = AppState::from_store(store);

        let first = seed_defaults(State(state.clone())).await.into_response();
        assert_eq!(first.headers()[LOCATION], "/?status=seeded");
        let seeded = count_terms(state.pool_ref()).await.expect("count");
        assert!(seeded > 0);

        let second = seed_defaults(State(state.clone())).await.into_response();
        assert_eq!(second.headers()[LOCATION], "/?error=already_seeded");
        assert_eq!(count_terms(state.pool_ref()).await.expect("count"), seeded);
    }

    #[tokio::test]
    async fn form_submission_creates_and_deletes_terms() {
        let store = Store::in_memory().await.expect("store");
        let state = AppState::from_store(store);
        ensure_defaults(state.pool_ref()).await.expect("languages");

        let fields = vec![
            ("primary_term".to_string(), "Hello".to_string()),
            ("definition".to_string(), String::new()),
            ("tr_spanish".to_string(), "Hola".to_string()),
        ];
        create_term(State(state.clone()), Form(fields)).await;
        assert_eq!(count_terms(state.pool_ref()).await.expect("count"), 1);

        let terms = glossary::list_wide(state.pool_ref()).await;
        assert_eq!(terms[0].translations["spanish"], "Hola");

        let form = DeleteForm {
            term_id: terms[0].term_id.to_string(),
        };
        delete_term(State(state.clone()), Form(form)).await;
        assert_eq!(count_terms(state.pool_ref()).await.expect("count"), 0);
    }
}
