#![allow(dead_code)]

use constcat::concat;
use reqwest::{
    header::{COOKIE, SET_COOKIE},
    RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use ticketing_backend::{api, session};

pub const BASE_URL: &str = "http://localhost:3000";

pub const PASSWORD: &str = "password";

pub fn peter() -> api::user::Id {
    api::user::Id::from(1)
}

pub fn lucy() -> api::user::Id {
    api::user::Id::from(4)
}

pub fn music_fest() -> api::event::Id {
    api::event::Id::from(1)
}

pub fn general() -> api::ticket_type::Id {
    api::ticket_type::Id::from(1)
}

pub fn vip() -> api::ticket_type::Id {
    api::ticket_type::Id::from(2)
}

pub fn student_pass() -> api::ticket_type::Id {
    api::ticket_type::Id::from(3)
}

/// HTTP client carrying the `user_session` cookie between calls.
pub struct Client {
    inner: reqwest::Client,
    pub session: Option<String>,
}

impl Client {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
            session: None,
        }
    }

    pub async fn logged_in(email: &str) -> Self {
        let mut client = Self::new();
        client
            .login(email, PASSWORD)
            .await
            .expect("failed to log in");
        client
    }

    async fn send(
        &mut self,
        mut req: RequestBuilder,
    ) -> Result<Response, StatusCode> {
        if let Some(cookie) = &self.session {
            req = req.header(COOKIE, cookie);
        }
        let resp = req.send().await.expect("failed to send a request");

        let prefix = concat!(session::COOKIE_NAME, "=");
        let set_cookie = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(prefix));
        if let Some(set_cookie) = set_cookie {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.session = (pair != prefix).then(|| pair.to_owned());
        }

        resp.error_for_status()
            .map_err(|e| e.status().expect("status error"))
    }

    async fn call<T: DeserializeOwned>(
        &mut self,
        req: RequestBuilder,
    ) -> Result<T, StatusCode> {
        Ok(self
            .send(req)
            .await?
            .json::<T>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<api::user::Session, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/auth/register");

        let req = self.inner.post(URL).json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }));
        self.call(req).await
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<api::user::Session, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/auth/login");

        let req = self.inner.post(URL).json(&json!({
            "email": email,
            "password": password,
        }));
        self.call(req).await
    }

    pub async fn session(
        &mut self,
    ) -> Result<Option<api::user::Session>, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/auth/session");

        let req = self.inner.get(URL);
        self.call(req).await
    }

    pub async fn logout(&mut self) -> Result<(), StatusCode> {
        const URL: &str = concat!(BASE_URL, "/auth/logout");

        let req = self.inner.post(URL);
        self.send(req).await.map(drop)
    }

    pub async fn switch_to_organizer(
        &mut self,
    ) -> Result<api::organizer::Switched, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/auth/switch-to-organizer");

        let req = self.inner.post(URL);
        self.call(req).await
    }

    pub async fn checkout(
        &mut self,
        body: Value,
    ) -> Result<api::Receipt, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/checkout");

        let req = self.inner.post(URL).json(&body);
        self.call(req).await
    }

    /// Buys tickets of one type for `user_id` with default attendee data.
    pub async fn buy(
        &mut self,
        user_id: api::user::Id,
        ticket_type_id: api::ticket_type::Id,
        quantity: u32,
    ) -> Result<api::Receipt, StatusCode> {
        self.checkout(json!({
            "user_id": user_id,
            "quantities": { ticket_type_id.to_string(): quantity },
            "attendee_name": "Test Attendee",
            "attendee_email": "attendee@event.com",
            "billing_address": "Nairobi",
            "payment_method": "card",
        }))
        .await
    }

    pub async fn profile_tickets(
        &mut self,
    ) -> Result<api::order::List, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/profile/tickets");

        let req = self.inner.get(URL);
        self.call(req).await
    }

    pub async fn organizer_profile(
        &mut self,
    ) -> Result<api::Organizer, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/organizer/profile");

        let req = self.inner.get(URL);
        self.call(req).await
    }

    pub async fn edit_organizer_profile(
        &mut self,
        patch: Value,
    ) -> Result<api::Organizer, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/organizer/profile");

        let req = self.inner.patch(URL).json(&patch);
        self.call(req).await
    }

    pub async fn add_event(
        &mut self,
        body: Value,
    ) -> Result<api::Event, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/events");

        let req = self.inner.post(URL).json(&body);
        self.call(req).await
    }

    pub async fn edit_event(
        &mut self,
        id: api::event::Id,
        patch: Value,
    ) -> Result<api::Event, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/events");

        let req = self.inner.patch(format!("{URL}/{id}")).json(&patch);
        self.call(req).await
    }

    pub async fn delete_event(
        &mut self,
        id: api::event::Id,
    ) -> Result<StatusCode, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/events");

        let req = self.inner.delete(format!("{URL}/{id}"));
        self.send(req).await.map(|resp| resp.status())
    }

    pub async fn organizer_ticket_types(
        &mut self,
    ) -> Result<api::ticket_type::List, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/organizer/ticket-types");

        let req = self.inner.get(URL);
        self.call(req).await
    }

    pub async fn add_ticket_type(
        &mut self,
        body: Value,
    ) -> Result<api::TicketType, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket-types");

        let req = self.inner.post(URL).json(&body);
        self.call(req).await
    }

    pub async fn edit_ticket_type(
        &mut self,
        id: api::ticket_type::Id,
        patch: Value,
    ) -> Result<api::TicketType, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket-types");

        let req = self.inner.patch(format!("{URL}/{id}")).json(&patch);
        self.call(req).await
    }

    pub async fn delete_ticket_type(
        &mut self,
        id: api::ticket_type::Id,
    ) -> Result<StatusCode, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket-types");

        let req = self.inner.delete(format!("{URL}/{id}"));
        self.send(req).await.map(|resp| resp.status())
    }

    pub async fn request_refund(
        &mut self,
        ticket_id: api::ticket::Id,
        reason: &str,
    ) -> Result<api::RefundRequest, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/tickets");

        let req = self
            .inner
            .post(format!("{URL}/{ticket_id}/refund"))
            .json(&json!({ "reason": reason }));
        self.call(req).await
    }

    pub async fn review_event(
        &mut self,
        id: api::event::Id,
        verdict: &str,
    ) -> Result<api::Event, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/management/events");

        let req = self.inner.post(format!("{URL}/{id}/{verdict}"));
        self.call(req).await
    }

    pub async fn process_refund(
        &mut self,
        id: api::refund::Id,
        verdict: &str,
        admin_notes: Option<&str>,
    ) -> Result<api::RefundRequest, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/management/refunds");

        let req = self
            .inner
            .post(format!("{URL}/{id}/{verdict}"))
            .json(&json!({ "adminNotes": admin_notes }));
        self.call(req).await
    }

    pub async fn get_raw(&mut self, path: &str) -> Result<Response, StatusCode> {
        let req = self.inner.get(format!("{BASE_URL}{path}"));
        self.send(req).await
    }
}

/// Fresh credentials that do not collide with earlier runs.
pub fn unique_user() -> (String, String) {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let username = format!("user-{}", &suffix[..12]);
    let email = format!("{username}@event.com");
    (username, email)
}
