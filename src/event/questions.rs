// The single next clarifying question, in fixed priority order.

use super::draft::EventDraft;

/// Return the next question to ask the user, or `None` when every field is
/// filled in. The order is fixed: name, date, venue, venue address, venue
/// city, tickets.
pub fn next_missing_question(event: &EventDraft) -> Option<&'static str> {
    if !event.has_name() {
        return Some("What is the name of the event?");
    }

    if !event.has_date() {
        return Some("On what date will the event take place?");
    }

    let Some(venue) = event.venue.as_ref() else {
        return Some("Where will the event be held? (address and city)");
    };

    if !venue.has_address() {
        return Some("What is the venue address?");
    }

    if !venue.has_city() {
        return Some("In which city will the event take place?");
    }

    if !event.has_tickets() {
        return Some("What ticket types will be offered, and at what prices?");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::draft::{Ticket, Venue};

    fn ticket() -> Ticket {
        Ticket {
            name: "Standard".into(),
            price: 15.0,
            currency: "EUR".into(),
        }
    }

    #[test]
    fn empty_draft_asks_for_name_first() {
        let q = next_missing_question(&EventDraft::default());
        assert_eq!(q, Some("What is the name of the event?"));
    }

    #[test]
    fn name_filled_asks_for_date() {
        let draft = EventDraft {
            name: Some("Jazz Night".into()),
            ..Default::default()
        };
        assert_eq!(
            next_missing_question(&draft),
            Some("On what date will the event take place?")
        );
    }

    #[test]
    fn missing_venue_asks_for_venue_as_a_whole() {
        let draft = EventDraft {
            name: Some("Jazz Night".into()),
            date: Some("2027-06-01".into()),
            ..Default::default()
        };
        assert_eq!(
            next_missing_question(&draft),
            Some("Where will the event be held? (address and city)")
        );
    }

    #[test]
    fn partial_venue_asks_for_the_missing_part() {
        let base = EventDraft {
            name: Some("Jazz Night".into()),
            date: Some("2027-06-01".into()),
            ..Default::default()
        };

        let no_address = EventDraft {
            venue: Some(Venue {
                address: None,
                city: Some("Torino".into()),
            }),
            ..base.clone()
        };
        assert_eq!(
            next_missing_question(&no_address),
            Some("What is the venue address?")
        );

        let no_city = EventDraft {
            venue: Some(Venue {
                address: Some("Via Roma 1".into()),
                city: None,
            }),
            ..base
        };
        assert_eq!(
            next_missing_question(&no_city),
            Some("In which city will the event take place?")
        );
    }

    #[test]
    fn venue_done_asks_for_tickets() {
        let draft = EventDraft {
            name: Some("Jazz Night".into()),
            date: Some("2027-06-01".into()),
            venue: Some(Venue {
                address: Some("Via Roma 1".into()),
                city: Some("Torino".into()),
            }),
            tickets: vec![],
        };
        assert_eq!(
            next_missing_question(&draft),
            Some("What ticket types will be offered, and at what prices?")
        );
    }

    #[test]
    fn complete_draft_has_no_question() {
        let draft = EventDraft {
            name: Some("Jazz Night".into()),
            date: Some("2027-06-01".into()),
            venue: Some(Venue {
                address: Some("Via Roma 1".into()),
                city: Some("Torino".into()),
            }),
            tickets: vec![ticket()],
        };
        assert_eq!(next_missing_question(&draft), None);
    }

    #[test]
    fn blank_name_still_asks_for_name() {
        let draft = EventDraft {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(
            next_missing_question(&draft),
            Some("What is the name of the event?")
        );
    }
}
