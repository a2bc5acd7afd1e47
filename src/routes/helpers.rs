use std::error::Error;

use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use serde_json::json;

pub fn error_chain_fmt(e: &impl Error, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }

    Ok(())
}

/// The permissive header set every intake response carries, preflight or
/// not, so browser form posts from the site work without a same-origin
/// deployment.
pub fn cors(builder: &mut HttpResponseBuilder) -> &mut HttpResponseBuilder {
    builder
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
}

pub async fn preflight() -> HttpResponse {
    cors(&mut HttpResponse::Ok()).finish()
}

pub fn success_json(message: &str) -> HttpResponse {
    cors(&mut HttpResponse::Ok()).json(json!({
        "success": true,
        "message": message,
    }))
}

/// Network-level origin of the request, used as the rate-limit key. Honors
/// forwarding headers when the app sits behind the platform's proxy.
pub fn source_address(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

pub fn prepare_html_template(
    ctx: &tera::Context,
    template_name: &str,
) -> Result<String, anyhow::Error> {
    let tera = tera::Tera::new("views/**/*")
        .map_err(|e| anyhow::anyhow!("Failed to initialize Tera templates: {e}"))?;
    tera.render(template_name, ctx)
        .map_err(|e| anyhow::anyhow!("Failed rendering template {template_name}: {e}"))
}
