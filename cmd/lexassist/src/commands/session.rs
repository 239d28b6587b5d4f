//! `lexassist session ...`

use std::process::ExitCode;

use anyhow::Result;
use domains::{SessionState, SessionStatus};

use crate::app::App;

/// Exit status when the guest quota is used up.
const QUOTA_EXHAUSTED: u8 = 2;

pub async fn start(app: &App) -> Result<ExitCode> {
    app.sessions.load().await;
    let session = app.sessions.start().await;
    println!("session: {}", session.id);
    print_quota(&app.sessions.status());
    Ok(ExitCode::SUCCESS)
}

pub async fn status(app: &App) -> Result<ExitCode> {
    app.sessions.load().await;
    let status = app.sessions.status();
    println!("state: {}", status.state);
    if let Some(session) = &status.session {
        println!("session: {}", session.id);
        println!("prompts used: {}", session.prompt_count);
    }
    print_quota(&status);
    Ok(ExitCode::SUCCESS)
}

pub async fn prompt(app: &App) -> Result<ExitCode> {
    app.sessions.load().await;
    if !app.sessions.increment_prompt_count().await {
        let status = app.sessions.status();
        eprintln!("{}", refusal_message(&status));
        return Ok(match status.state {
            SessionState::LimitReached => ExitCode::from(QUOTA_EXHAUSTED),
            _ => ExitCode::FAILURE,
        });
    }
    print_quota(&app.sessions.status());
    Ok(ExitCode::SUCCESS)
}

pub async fn rotate(app: &App, id: &str) -> Result<ExitCode> {
    app.sessions.load().await;
    let session = app.sessions.update_session_id(id).await;
    println!("session: {}", session.id);
    Ok(ExitCode::SUCCESS)
}

pub async fn clear(app: &App) -> Result<ExitCode> {
    app.sessions.clear().await;
    println!("session cleared");
    Ok(ExitCode::SUCCESS)
}

/// Why a prompt was refused, judged from the state left behind.
///
/// An expired or unreadable record is cleared on refusal, so `NoSession`
/// here means the record was reset rather than the quota spent.
fn refusal_message(status: &SessionStatus) -> String {
    match (&status.state, &status.time_until_reset) {
        (SessionState::LimitReached, Some(reset)) => {
            format!("Guest prompt limit reached. Resets in {reset}.")
        }
        (SessionState::LimitReached, None) => {
            "Guest prompt limit reached. Start a new session to continue.".to_string()
        }
        (SessionState::NoSession | SessionState::Expired, _) => {
            "The guest session had expired or could not be read and has been reset. \
             Run the command again to start a new session."
                .to_string()
        }
        (SessionState::Active, _) => "The prompt could not be recorded. Try again.".to_string(),
    }
}

fn print_quota(status: &SessionStatus) {
    println!("prompts remaining: {}", status.prompts_remaining);
    if let Some(reset) = &status.time_until_reset {
        println!("resets in: {reset}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: SessionState, time_until_reset: Option<&str>) -> SessionStatus {
        SessionStatus {
            state,
            session: None,
            prompts_remaining: 0,
            has_reached_limit: state == SessionState::LimitReached,
            time_until_reset: time_until_reset.map(str::to_string),
        }
    }

    #[test]
    fn exhausted_quota_reports_the_reset_time() {
        let message = refusal_message(&status(SessionState::LimitReached, Some("3h 12m")));
        assert_eq!(message, "Guest prompt limit reached. Resets in 3h 12m.");
    }

    #[test]
    fn reset_record_is_not_reported_as_an_exhausted_quota() {
        let message = refusal_message(&status(SessionState::NoSession, None));
        assert!(!message.contains("limit reached"));
        assert!(message.contains("has been reset"));
        assert!(message.contains("Run the command again"));
    }
}
