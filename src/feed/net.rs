//! Background requests: guess submission and the challenge result report.

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    FormData, Headers, HtmlFormElement, Request, RequestInit, Response, UrlSearchParams,
};

use crate::dom;
use crate::error::{GENERIC_SERVER_ERROR, GameError};
use crate::model::{ErrorBody, GuessResponse};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const XHR_HEADER: &str = "X-Requested-With";
pub const XHR_VALUE: &str = "XMLHttpRequest";

/// Snapshot of the guess form, taken before its controls are disabled.
pub struct GuessSubmission {
    pub action: String,
    pub body: FormData,
    pub csrf: String,
}

impl GuessSubmission {
    pub fn capture(form: &HtmlFormElement, csrf: &str) -> Result<Self, GameError> {
        Ok(Self {
            action: form.action(),
            body: FormData::new_with_form(form)?,
            csrf: csrf.to_string(),
        })
    }
}

/// POST the captured guess form to its action and decode the answer.
pub async fn post_guess(submission: &GuessSubmission) -> Result<GuessResponse, GameError> {
    let (status, text) = post(&submission.action, &submission.body, &submission.csrf).await?;
    log::debug!("guess answered with {status}");
    decode_guess_response(status, &text)
}

/// Turn a status + body into either a guess response or the server's complaint.
pub fn decode_guess_response(status: u16, body: &str) -> Result<GuessResponse, GameError> {
    if (200..300).contains(&status) {
        return Ok(serde_json::from_str(body)?);
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
    Err(GameError::Server { status, message })
}

async fn post(url: &str, body: &JsValue, csrf: &str) -> Result<(u16, String), GameError> {
    let headers = Headers::new()?;
    headers.set(CSRF_HEADER, csrf)?;
    headers.set(XHR_HEADER, XHR_VALUE)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(body);
    let request = Request::new_with_str_and_init(url, &init)?;

    let resp = JsFuture::from(dom::win()?.fetch_with_request(&request))
        .await
        .map_err(GameError::transport)?;
    let resp: Response = resp.dyn_into()?;
    let text = JsFuture::from(resp.text()?)
        .await
        .map_err(GameError::transport)?;
    Ok((resp.status(), text.as_string().unwrap_or_default()))
}

/// How often and how patiently the challenge report is retried before it is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next try after `failures` failed ones; `None` means give up.
    pub fn backoff_ms(&self, failures: u32) -> Option<u32> {
        if failures == 0 || failures >= self.max_attempts {
            return None;
        }
        Some(self.base_delay_ms.saturating_mul(1 << (failures - 1).min(16)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Delivered { tries: u32 },
    Dropped { tries: u32 },
}

/// Report how many attempts the challenge took. Never surfaces errors to the player.
pub async fn report_challenge(
    url: String,
    csrf: String,
    attempts: usize,
    policy: RetryPolicy,
) -> ReportOutcome {
    let mut failures = 0;
    loop {
        let err = match send_report(&url, &csrf, attempts).await {
            Ok(()) => {
                log::info!("challenge result ({attempts} attempts) reported");
                return ReportOutcome::Delivered { tries: failures + 1 };
            }
            Err(err) => err,
        };
        failures += 1;
        match policy.backoff_ms(failures) {
            Some(delay) => {
                log::warn!("challenge report failed ({err}), retrying in {delay} ms");
                TimeoutFuture::new(delay).await;
            }
            None => {
                log::error!("challenge report dropped after {failures} tries: {err}");
                return ReportOutcome::Dropped { tries: failures };
            }
        }
    }
}

async fn send_report(url: &str, csrf: &str, attempts: usize) -> Result<(), GameError> {
    let body = UrlSearchParams::new()?;
    body.append("attempts", &attempts.to_string());
    let (status, _) = post(url, &body, csrf).await?;
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(GameError::Server {
            status,
            message: GENERIC_SERVER_ERROR.to_string(),
        })
    }
}
