use actix_identity::Identity;
use actix_web::{
    get,
    http::{
        header::{self, ContentDisposition, DispositionParam, DispositionType},
        Method, StatusCode,
    },
    post,
    web::{self, Data},
    HttpRequest, HttpResponse, Responder, ResponseError,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::{
    auth::LoginState,
    db,
    errors::{AppError, INVALID_CREDENTIALS, STORE_UNAVAILABLE},
    export::{self, ExportFormat},
    structs::{NewEnquiry, ENQUIRY_COLUMNS, FURNITURE_CATEGORIES},
    AppState, TEMPLATES,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index_handler)
        .service(enquiry_form_handler)
        .service(login_handler)
        .service(login_form_handler)
        .service(logout_handler)
        .service(dashboard_handler)
        .service(export_xlsx_handler)
        .service(export_pdf_handler)
        .default_service(web::to(default_handler));
}

fn base_context(title: &str) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context
}

fn render(
    template: &str,
    context: &Context,
    status: StatusCode,
) -> Result<HttpResponse, AppError> {
    let rendered = TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template: {}", e);
        AppError::Template(e)
    })?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(rendered))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Values of the enquiry form as submitted. The category checkboxes arrive as
/// repeated `furniture_type` keys.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EnquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub furniture_types: Vec<String>,
    pub message: String,
}

impl EnquiryForm {
    pub fn parse(body: &[u8]) -> Self {
        let mut form = EnquiryForm::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "name" => form.name = value.into_owned(),
                "email" => form.email = value.into_owned(),
                "phone" => form.phone = value.into_owned(),
                "furniture_type" => form.furniture_types.push(value.into_owned()),
                "message" => form.message = value.into_owned(),
                _ => {}
            }
        }
        form
    }

    pub fn validate(&self) -> Result<NewEnquiry, AppError> {
        NewEnquiry::validate(
            &self.name,
            &self.email,
            &self.phone,
            &self.furniture_types,
            &self.message,
        )
    }
}

fn enquiry_page(
    form: &EnquiryForm,
    success: bool,
    error: Option<&str>,
    status: StatusCode,
) -> Result<HttpResponse, AppError> {
    let mut context = base_context("Enquiry Form");
    context.insert("categories", &FURNITURE_CATEGORIES);
    context.insert("form", form);
    context.insert("success", &success);
    context.insert("error", &error.unwrap_or(""));
    render("enquiry.html", &context, status)
}

#[get("/")]
pub async fn index_handler() -> Result<impl Responder, AppError> {
    enquiry_page(&EnquiryForm::default(), false, None, StatusCode::OK)
}

#[post("/enquiry")]
pub async fn enquiry_form_handler(
    body: web::Bytes,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let form = EnquiryForm::parse(&body);

    let new = match form.validate() {
        Ok(new) => new,
        Err(AppError::Validation(msg)) => {
            return enquiry_page(&form, false, Some(&msg), StatusCode::BAD_REQUEST);
        }
        Err(e) => return Err(e),
    };

    match db::insert_enquiry(&state.db_pool, &new).await {
        Ok(_) => enquiry_page(&EnquiryForm::default(), true, None, StatusCode::OK),
        Err(e) if e.is_store_unavailable() => {
            enquiry_page(&form, false, Some(STORE_UNAVAILABLE), e.status_code())
        }
        Err(e) => Err(e),
    }
}

#[derive(Deserialize)]
pub struct Login {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn login_page(
    username: &str,
    error: Option<&str>,
    status: StatusCode,
) -> Result<HttpResponse, AppError> {
    let mut context = base_context("Owner Login");
    context.insert("username", username);
    context.insert("error", &error.unwrap_or(""));
    render("login.html", &context, status)
}

#[get("/login")]
pub async fn login_handler(identity: Option<Identity>) -> Result<impl Responder, AppError> {
    if LoginState::from_identity(identity.as_ref()).is_logged_in() {
        return Ok(redirect("/dashboard"));
    }
    login_page("", None, StatusCode::OK)
}

#[post("/login")]
pub async fn login_form_handler(
    web::Form(form): web::Form<Login>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    if form.username.is_empty() || form.password.is_empty() {
        return login_page(
            &form.username,
            Some("Please enter both username and password."),
            StatusCode::BAD_REQUEST,
        );
    }

    match LoginState::login(&state.db_pool, &request, &form.username, &form.password).await {
        Ok(_) => Ok(redirect("/dashboard")),
        Err(AppError::InvalidCredentials) => login_page(
            &form.username,
            Some(INVALID_CREDENTIALS),
            StatusCode::UNAUTHORIZED,
        ),
        Err(e) if e.is_store_unavailable() => login_page(
            &form.username,
            Some(STORE_UNAVAILABLE),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        Err(e) => Err(e),
    }
}

#[post("/logout")]
pub async fn logout_handler(identity: Option<Identity>) -> impl Responder {
    LoginState::logout(identity);
    redirect("/login")
}

#[get("/dashboard")]
pub async fn dashboard_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    if !LoginState::from_identity(identity.as_ref()).is_logged_in() {
        return Ok(redirect("/login"));
    }

    let mut context = base_context("Owner Dashboard");
    context.insert("columns", &ENQUIRY_COLUMNS);

    match db::get_all_enquiries(&state.db_pool).await {
        Ok(enquiries) => {
            context.insert("enquiries", &export::rows(&enquiries));
            context.insert("store_error", "");
            render("dashboard.html", &context, StatusCode::OK)
        }
        Err(e) => {
            let message = if e.is_store_unavailable() {
                STORE_UNAVAILABLE
            } else {
                "Could not load enquiries. Please try again."
            };
            context.insert("enquiries", &Vec::<Vec<String>>::new());
            context.insert("store_error", message);
            render("dashboard.html", &context, e.status_code())
        }
    }
}

async fn export_response(
    state: Data<AppState>,
    identity: Option<Identity>,
    format: ExportFormat,
) -> Result<HttpResponse, AppError> {
    if !LoginState::from_identity(identity.as_ref()).is_logged_in() {
        return Ok(redirect("/login"));
    }

    let enquiries = db::get_all_enquiries(&state.db_pool).await?;
    let exports = state.exports.clone();
    let bytes = web::block(move || exports.get_or_render(format, &enquiries))
        .await
        .map_err(|e| AppError::Export(e.to_string()))?
        .map_err(|e| {
            log::error!("{} export failed: {}", format.extension(), e);
            e
        })?;

    let filename = export::export_filename(format, Local::now().naive_local());
    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes))
}

#[get("/dashboard/export.xlsx")]
pub async fn export_xlsx_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    export_response(state, identity, ExportFormat::Spreadsheet).await
}

#[get("/dashboard/export.pdf")]
pub async fn export_pdf_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    export_response(state, identity, ExportFormat::Document).await
}

async fn default_handler(req_method: Method) -> HttpResponse {
    match req_method {
        Method::GET => HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("Not found"),
        _ => HttpResponse::MethodNotAllowed().finish(),
    }
}
