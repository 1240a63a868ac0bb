//! HTML assembly for the server-rendered pages.
//!
//! Markup is built directly into strings; there is no client-side script.
//! Every interpolated value goes through `escape`.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::upstream::Todo;

/// Serve a full HTML document. Pages are always revalidated.
pub fn html_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// Entity-escape a value interpolated into markup or attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n\
         </head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

fn field_error(id: &str, message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            "<p id=\"{}\" class=\"form-validation-error\" role=\"alert\">{}</p>\n",
            id,
            escape(message)
        ),
        None => String::new(),
    }
}

/// Values and errors re-rendered into the login and register forms.
#[derive(Default)]
pub struct CredentialFormView<'a> {
    pub username: Option<&'a str>,
    pub username_error: Option<&'a str>,
    pub password_error: Option<&'a str>,
    pub form_error: Option<&'a str>,
    pub redirect_to: Option<&'a str>,
}

fn credential_form(action: &str, submit_label: &str, view: &CredentialFormView<'_>) -> String {
    let redirect_field = match view.redirect_to {
        Some(target) => format!(
            "<input type=\"hidden\" name=\"redirect_to\" value=\"{}\">\n",
            escape(target)
        ),
        None => String::new(),
    };
    format!(
        "<form method=\"post\" action=\"{action}\" aria-describedby=\"form-error-message\">\n\
         {redirect_field}\
         <div>\n\
         <label for=\"username-input\">Username</label>\n\
         <input type=\"text\" id=\"username-input\" name=\"username\" value=\"{username}\" required>\n\
         </div>\n\
         {username_error}\
         <div>\n\
         <label for=\"password-input\">Password</label>\n\
         <input type=\"password\" id=\"password-input\" name=\"password\" required>\n\
         </div>\n\
         {password_error}\
         {form_error}\
         <button type=\"submit\" class=\"button\">{submit_label}</button>\n\
         </form>\n",
        action = action,
        submit_label = submit_label,
        redirect_field = redirect_field,
        username = escape(view.username.unwrap_or("")),
        username_error = field_error("username-error", view.username_error),
        password_error = field_error("password-error", view.password_error),
        form_error = field_error("form-error-message", view.form_error),
    )
}

pub fn login_page(view: &CredentialFormView<'_>) -> String {
    let body = format!(
        "<div class=\"container\">\n<div class=\"content\">\n<h1>Login</h1>\n{}\
         <p><a href=\"/register\">Register</a></p>\n</div>\n</div>\n",
        credential_form("/login", "Login", view)
    );
    document("Login", &body)
}

pub fn register_page(view: &CredentialFormView<'_>) -> String {
    let body = format!(
        "<div class=\"container\">\n<div class=\"content\">\n<h1>Register</h1>\n{}\
         <p><a href=\"/login\">Login</a></p>\n</div>\n</div>\n",
        credential_form("/register", "Register", view)
    );
    document("Register", &body)
}

fn todo_item(todo: &Todo) -> String {
    let id = escape(&todo.id);
    let title = escape(&todo.title);
    let circle = if todo.is_completed {
        "circle circle-fill"
    } else {
        "circle"
    };
    format!(
        "<li class=\"todo-item\">\n\
         <form method=\"post\" action=\"/todos\">\n\
         <input type=\"hidden\" name=\"id\" value=\"{id}\">\n\
         <input type=\"hidden\" name=\"is_completed\" value=\"{completed}\">\n\
         <button type=\"submit\" name=\"intent\" value=\"toggle\" class=\"{circle}\"></button>\n\
         </form>\n\
         <form method=\"post\" action=\"/todos\" class=\"update-form\">\n\
         <input type=\"hidden\" name=\"id\" value=\"{id}\">\n\
         <input type=\"text\" name=\"title\" value=\"{title}\" class=\"todo-title\">\n\
         <button type=\"submit\" name=\"intent\" value=\"rename\" class=\"button\">Save</button>\n\
         </form>\n\
         <form method=\"post\" action=\"/todos\">\n\
         <input type=\"hidden\" name=\"id\" value=\"{id}\">\n\
         <button type=\"submit\" name=\"intent\" value=\"delete\" class=\"button\">Delete</button>\n\
         </form>\n\
         </li>\n",
        id = id,
        title = title,
        completed = todo.is_completed,
        circle = circle,
    )
}

pub fn todos_page(username: Option<&str>, todos: &[Todo], title_error: Option<&str>) -> String {
    let nav = match username {
        Some(username) => format!(
            "<nav>\n<span>Hello {}</span>\n\
             <form method=\"post\" action=\"/logout\">\n\
             <button type=\"submit\" class=\"button\">Logout</button>\n\
             </form>\n</nav>\n",
            escape(username)
        ),
        None => String::new(),
    };

    let list = if todos.is_empty() {
        "<p>No todos found</p>\n".to_string()
    } else {
        let items: String = todos.iter().map(todo_item).collect();
        format!("<ul class=\"todos-list\">\n{}</ul>\n", items)
    };

    let body = format!(
        "{nav}<div class=\"main-wrapper\">\n<h1>Todos</h1>\n<main>\n{list}\
         <form method=\"post\" action=\"/todos\">\n\
         <label for=\"title\">Title</label>\n\
         <input id=\"title\" name=\"title\" type=\"text\">\n\
         {title_error}\
         <button type=\"submit\" name=\"intent\" value=\"create\" class=\"button\">Submit</button>\n\
         </form>\n</main>\n</div>\n",
        nav = nav,
        list = list,
        title_error = field_error("title-error", title_error),
    );
    document("Todos", &body)
}

/// A bare error page for failures no form can absorb.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<div class=\"error-container\">\n<h1>{}</h1>\n<pre>{}</pre>\n</div>\n",
        status,
        escape(message)
    );
    html_response(status, document(&status.to_string(), &body))
}
