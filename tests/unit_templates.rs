// Unit tests for template lookup and rendering.

use outreach::store::models::Stage;
use outreach::templates::{lookup, render, render_with, Sequence, Template};

#[test]
fn lookup_known_sequence_and_stage() {
    let template = lookup("hiring", "followup_2");
    assert_eq!(template, Sequence::Hiring.template(Stage::Followup2));
}

#[test]
fn unknown_sequence_falls_back_to_core() {
    assert_eq!(
        lookup("no_such_sequence", "followup_1"),
        Sequence::Core.template(Stage::Followup1)
    );
}

#[test]
fn unknown_stage_falls_back_to_initial() {
    assert_eq!(
        lookup("running_ads", "followup_9"),
        Sequence::RunningAds.template(Stage::Initial)
    );
}

#[test]
fn every_sequence_has_three_distinct_stages() {
    for sequence in Sequence::ALL {
        let subjects: Vec<&str> = Stage::ALL
            .iter()
            .map(|stage| sequence.template(*stage).subject)
            .collect();
        assert_eq!(subjects.len(), 3);
        assert_ne!(subjects[0], subjects[1], "{sequence}");
        assert_ne!(subjects[1], subjects[2], "{sequence}");
    }
}

#[test]
fn sequence_names_round_trip() {
    for sequence in Sequence::ALL {
        assert_eq!(Sequence::from_name(sequence.as_str()), sequence);
    }
    assert_eq!(Sequence::for_record(None), Sequence::Core);
    assert_eq!(Sequence::for_record(Some("high_reviews")), Sequence::HighReviews);
}

#[test]
fn render_substitutes_names_verbatim() {
    let message = render(
        Sequence::Core.template(Stage::Initial),
        "Priya",
        "Radiance Aesthetics",
    );
    assert!(message.subject.contains("Radiance Aesthetics"));
    assert!(message.body.starts_with("Hi Priya,"));
    assert!(message.is_complete());
    assert!(!message.subject.contains('{'));
    assert!(!message.body.contains('{'));
}

#[test]
fn render_does_not_interpret_braces_in_values() {
    let message = render(Sequence::Core.template(Stage::Followup1), "{company_name}", "Acme");
    // Values are inserted once and never re-read
    assert!(message.body.starts_with("Hi {company_name},"));
    assert!(message.is_complete());
}

#[test]
fn bodies_carry_unsubscribe_footer() {
    for sequence in Sequence::ALL {
        for stage in Stage::ALL {
            assert!(sequence.template(stage).body.contains("%unsubscribe_url%"));
        }
    }
}

#[test]
fn high_reviews_initial_reports_missing_review_count() {
    let message = render(
        Sequence::HighReviews.template(Stage::Initial),
        "Lee",
        "Skin Studio",
    );
    assert!(!message.is_complete());
    assert_eq!(message.missing, vec!["google_review_count".to_string()]);
}

#[test]
fn extra_values_fill_sequence_specific_placeholders() {
    let message = render_with(
        Sequence::HighReviews.template(Stage::Initial),
        &[
            ("first_name", "Lee"),
            ("company_name", "Skin Studio"),
            ("google_review_count", "230"),
        ],
    );
    assert!(message.is_complete());
    assert!(message.body.contains("Skin Studio has 230 Google reviews"));
}

#[test]
fn missing_names_listed_once_in_order() {
    let template = Template {
        subject: "{b} for {company_name}",
        body: "{a} {b} {a} %unsubscribe_url%",
    };
    let message = render(&template, "Lee", "Skin Studio");
    assert_eq!(message.subject, "{b} for Skin Studio");
    assert_eq!(message.missing, vec!["b".to_string(), "a".to_string()]);
}
