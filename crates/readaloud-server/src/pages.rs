use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use http::StatusCode;
use identity::SignedInUser;
use minijinja::{Environment, context};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("readalong.html", include_str!("../templates/readalong.html")),
];

/// HTML pages rendered from the embedded templates
pub struct Pages {
    env: Environment<'static>,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to render {template}: {source}")]
pub struct RenderError {
    template: &'static str,
    source: minijinja::Error,
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        tracing::error!("{self}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    fn render(&self, template: &'static str, ctx: minijinja::Value) -> Result<Html<String>, RenderError> {
        self.env
            .get_template(template)
            .and_then(|t| t.render(ctx))
            .map(Html)
            .map_err(|source| RenderError { template, source })
    }
}

pub fn page_router() -> Router<Arc<Pages>> {
    Router::new()
        .route("/", get(home))
        .route("/listening", get(listening))
        .route("/readalong", get(readalong))
}

async fn home(
    State(pages): State<Arc<Pages>>,
    user: Option<Extension<SignedInUser>>,
) -> Result<Html<String>, RenderError> {
    let (session, pretty) = match user {
        Some(Extension(user)) => {
            let pretty = serde_json::to_string_pretty(&user.claims).unwrap_or_default();
            (Some(user.claims), Some(pretty))
        }
        None => (None, None),
    };

    pages.render("home.html", context! { session, pretty })
}

async fn listening(
    State(pages): State<Arc<Pages>>,
    user: Option<Extension<SignedInUser>>,
) -> Result<Html<String>, RenderError> {
    let session = user.map(|Extension(user)| user.claims);

    pages.render("index.html", context! { session })
}

async fn readalong(State(pages): State<Arc<Pages>>) -> Result<Html<String>, RenderError> {
    pages.render("readalong.html", context! {})
}
