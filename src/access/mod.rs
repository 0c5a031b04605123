//! Role predicates and route guards.
//!
//! Guards are pure: they look at the caller's account (already reloaded from
//! the store for this request) and produce an [`Access`] verdict. Turning a
//! denial into a response is left to [`Denial::respond`], so every guarded
//! route reacts to the same verdict in the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::database::models::{Account, Role};
use crate::error::LOGIN_ROUTE;

/// Body returned when a non-student reaches a student-only route.
pub const STUDENT_DENIED_BODY: &str =
    "403 Forbidden: You are not a student and cannot access this page.";

/// Tutor directory, where denied tutors are sent.
pub const TUTORS_ROUTE: &str = "/";

pub fn has_role(account: &Account, role: Role) -> bool {
    account.role == role
}

pub fn is_student(account: &Account) -> bool {
    has_role(account, Role::Student)
}

pub fn is_tutor(account: &Account) -> bool {
    has_role(account, Role::Tutor)
}

pub fn is_admin(account: &Account) -> bool {
    has_role(account, Role::Admin)
}

/// What a guard does with a caller that lacks the required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDenied {
    /// Answer with a fixed 403 body.
    Respond(&'static str),
    /// Send the caller to another route.
    Redirect(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    MissingRole { required: Role, on_denied: OnDenied },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny(Denial),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }
}

/// The "must be logged in" check. Runs before any role check.
pub fn require_login(caller: Option<&Account>) -> Access {
    match caller {
        Some(_) => Access::Allow,
        None => Access::Deny(Denial::Unauthenticated),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGuard {
    pub role: Role,
    pub on_denied: OnDenied,
}

impl RoleGuard {
    pub fn new(role: Role, on_denied: OnDenied) -> Self {
        Self { role, on_denied }
    }

    pub fn student() -> Self {
        Self::new(Role::Student, OnDenied::Respond(STUDENT_DENIED_BODY))
    }

    pub fn tutor() -> Self {
        Self::new(Role::Tutor, OnDenied::Redirect(TUTORS_ROUTE))
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin, OnDenied::Redirect(LOGIN_ROUTE))
    }

    pub fn check(&self, caller: Option<&Account>) -> Access {
        match caller {
            None => Access::Deny(Denial::Unauthenticated),
            Some(account) if has_role(account, self.role) => Access::Allow,
            Some(_) => Access::Deny(Denial::MissingRole {
                required: self.role,
                on_denied: self.on_denied,
            }),
        }
    }
}

/// `/login?next=<path>` with `next` percent-encoded.
pub fn login_redirect(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{}?next={}", LOGIN_ROUTE, encoded)
}

impl Denial {
    /// Response for a denied request to `path`.
    pub fn respond(self, path: &str) -> Response {
        match self {
            Denial::Unauthenticated => Redirect::to(&login_redirect(path)).into_response(),
            Denial::MissingRole { on_denied: OnDenied::Respond(body), .. } => {
                (StatusCode::FORBIDDEN, body).into_response()
            }
            Denial::MissingRole { on_denied: OnDenied::Redirect(route), .. } => {
                Redirect::to(route).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(role: Role) -> Account {
        Account {
            id: 1,
            username: "someone".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn predicates_follow_the_role() {
        let student = account(Role::Student);
        let tutor = account(Role::Tutor);
        let admin = account(Role::Admin);

        assert!(is_student(&student) && !is_tutor(&student) && !is_admin(&student));
        assert!(is_tutor(&tutor) && !is_student(&tutor));
        assert!(is_admin(&admin) && !is_tutor(&admin));
    }

    #[test]
    fn anonymous_callers_are_unauthenticated_for_every_guard() {
        for guard in [RoleGuard::student(), RoleGuard::tutor(), RoleGuard::admin()] {
            assert_eq!(guard.check(None), Access::Deny(Denial::Unauthenticated));
        }
        assert_eq!(require_login(None), Access::Deny(Denial::Unauthenticated));
        assert!(require_login(Some(&account(Role::Tutor))).is_allowed());
    }

    #[test]
    fn guards_allow_only_their_role() {
        assert!(RoleGuard::admin().check(Some(&account(Role::Admin))).is_allowed());
        assert_eq!(
            RoleGuard::admin().check(Some(&account(Role::Tutor))),
            Access::Deny(Denial::MissingRole {
                required: Role::Admin,
                on_denied: OnDenied::Redirect(LOGIN_ROUTE),
            })
        );
    }

    #[test]
    fn student_denial_is_a_fixed_403() {
        let denial = match RoleGuard::student().check(Some(&account(Role::Tutor))) {
            Access::Deny(denial) => denial,
            Access::Allow => panic!("tutor passed the student guard"),
        };
        let response = denial.respond("/student_dashboard");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn tutor_denial_redirects_to_directory() {
        let response = Denial::MissingRole {
            required: Role::Tutor,
            on_denied: OnDenied::Redirect(TUTORS_ROUTE),
        }
        .respond("/tutor_dashboard");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[test]
    fn login_redirect_keeps_the_target() {
        assert_eq!(login_redirect("/request/3"), "/login?next=%2Frequest%2F3");
        let response = Denial::Unauthenticated.respond("/feedback/1");
        assert_eq!(response.headers()["location"], "/login?next=%2Ffeedback%2F1");
    }
}
