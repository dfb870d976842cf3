use super::*;

#[test]
fn success_statuses_need_the_body() {
    assert_eq!(outcome_for_status(200), None);
    assert_eq!(outcome_for_status(204), None);
}

#[test]
fn auth_statuses_are_rejections() {
    assert_eq!(outcome_for_status(401), Some(CheckOutcome::Rejected));
    assert_eq!(outcome_for_status(403), Some(CheckOutcome::Rejected));
}

#[test]
fn other_statuses_are_failures() {
    assert_eq!(
        outcome_for_status(502),
        Some(CheckOutcome::Failed("identity check failed: 502".to_owned()))
    );
    assert_eq!(
        outcome_for_status(302),
        Some(CheckOutcome::Failed("identity check failed: 302".to_owned()))
    );
}

#[test]
fn login_failed_message_formats_status() {
    assert_eq!(login_failed_message(401), "Invalid email or password.");
    assert_eq!(login_failed_message(429), "Too many attempts; try again shortly.");
    assert_eq!(login_failed_message(500), "login failed: 500");
}
