use crate::models::UserRecord;

/// Authentication slice.
///
/// `is_authenticated` is derived from `user` rather than stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Authenticated user, if any.
    pub user: Option<UserRecord>,
    /// At least one auth operation is in flight.
    pub loading: bool,
    /// Message from the most recent failed operation.
    pub error: Option<String>,
    in_flight: usize,
}

impl SessionState {
    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Session slice transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An auth operation began.
    Started,
    /// Login or registration produced a user.
    Authenticated(UserRecord),
    /// A mirrored user was restored without a remote call.
    Restored(UserRecord),
    /// An auth operation ended in failure.
    Failed(String),
    /// The session was cleared.
    LoggedOut,
}

/// Pure transition function for the session slice.
///
/// `loading` stays set until every started operation has reached a terminal
/// event, so overlapping logins keep it up until the last one finishes.
pub fn reduce(state: SessionState, event: &SessionEvent) -> SessionState {
    match event {
        SessionEvent::Started => {
            let in_flight = state.in_flight + 1;
            SessionState {
                loading: true,
                error: None,
                in_flight,
                ..state
            }
        }
        SessionEvent::Authenticated(user) => {
            let in_flight = state.in_flight.saturating_sub(1);
            SessionState {
                user: Some(user.clone()),
                loading: in_flight > 0,
                error: None,
                in_flight,
            }
        }
        SessionEvent::Restored(user) => SessionState {
            user: Some(user.clone()),
            error: None,
            ..state
        },
        SessionEvent::Failed(message) => {
            let in_flight = state.in_flight.saturating_sub(1);
            SessionState {
                loading: in_flight > 0,
                error: Some(message.clone()),
                in_flight,
                ..state
            }
        }
        SessionEvent::LoggedOut => SessionState {
            user: None,
            error: None,
            ..state
        },
    }
}
