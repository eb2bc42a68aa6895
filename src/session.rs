/// Holds the vendor session cookie, e.g. `PHPSESSID=abc123`.
///
/// Single-writer, single-reader: the auth manager owns the only instance and
/// the scheduler loop never issues concurrent vendor calls, so no
/// synchronization is needed.
#[derive(Debug, Default)]
pub struct Session {
    cookie: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cookie pair to attach as the `Cookie` header, if one is held.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.cookie.is_none()
    }

    pub fn set_cookie(&mut self, cookie: String) {
        self.cookie = Some(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_anonymous() {
        let session = Session::new();
        assert!(session.is_anonymous());
        assert_eq!(session.cookie(), None);
    }

    #[test]
    fn holds_the_last_cookie_set() {
        let mut session = Session::new();
        session.set_cookie("PHPSESSID=first".to_string());
        session.set_cookie("PHPSESSID=second".to_string());
        assert_eq!(session.cookie(), Some("PHPSESSID=second"));
    }
}
