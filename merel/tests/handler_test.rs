/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate merel;

use std::cell::RefCell;
use std::rc::Rc;
use merel::errors::ConstructionError;
use merel::handlers::{ChainedHandler, RdfHandler, SharedHandler};
use shared::triple::Triple;

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every event it sees and optionally asks the producer to
    /// stop after a given number of triples.
    #[derive(Default)]
    struct RecordingHandler {
        events: Vec<String>,
        stop_after: Option<usize>,
        triples_seen: usize,
    }

    impl RecordingHandler {
        fn shared(stop_after: Option<usize>) -> Rc<RefCell<RecordingHandler>> {
            Rc::new(RefCell::new(RecordingHandler {
                stop_after,
                ..Default::default()
            }))
        }
    }

    impl RdfHandler for RecordingHandler {
        fn start_rdf(&mut self) {
            self.events.push("start".to_string());
        }

        fn end_rdf(&mut self, ok: bool) {
            self.events.push(format!("end({})", ok));
        }

        fn handle_triple(&mut self, triple: &Triple) -> bool {
            self.triples_seen += 1;
            self.events.push(format!("triple({})", triple.subject));
            match self.stop_after {
                Some(limit) => self.triples_seen < limit,
                None => true,
            }
        }

        fn handle_namespace(&mut self, prefix: &str, _iri: &str) -> bool {
            self.events.push(format!("namespace({})", prefix));
            true
        }

        fn handle_base(&mut self, iri: &str) -> bool {
            self.events.push(format!("base({})", iri));
            true
        }
    }

    fn as_sink(handler: &Rc<RefCell<RecordingHandler>>) -> SharedHandler {
        Rc::<RefCell<RecordingHandler>>::clone(handler)
    }

    #[test]
    fn every_sink_sees_facts_until_one_stops() {
        let a = RecordingHandler::shared(None);
        let b = RecordingHandler::shared(Some(2));
        let c = RecordingHandler::shared(None);

        let mut chain =
            ChainedHandler::new(vec![as_sink(&a), as_sink(&b), as_sink(&c)]).unwrap();

        chain.start_rdf();
        assert!(chain.handle_triple(&Triple::new(1, 10, 100)));
        // b signals stop on the second fact, so c never receives it and
        // the chain propagates the stop signal.
        assert!(!chain.handle_triple(&Triple::new(2, 10, 100)));
        chain.end_rdf(false);

        assert_eq!(
            a.borrow().events,
            vec!["start", "triple(1)", "triple(2)", "end(false)"]
        );
        assert_eq!(
            b.borrow().events,
            vec!["start", "triple(1)", "triple(2)", "end(false)"]
        );
        assert_eq!(c.borrow().events, vec!["start", "triple(1)", "end(false)"]);
    }

    #[test]
    fn declarations_follow_the_same_short_circuit_rule() {
        let a = RecordingHandler::shared(None);
        let b = RecordingHandler::shared(None);

        let mut chain = ChainedHandler::new(vec![as_sink(&a), as_sink(&b)]).unwrap();

        chain.start_rdf();
        assert!(chain.handle_namespace("ex", "http://example.org/"));
        assert!(chain.handle_base("http://example.org/base"));
        chain.end_rdf(true);

        for handler in [&a, &b] {
            assert_eq!(
                handler.borrow().events,
                vec![
                    "start",
                    "namespace(ex)",
                    "base(http://example.org/base)",
                    "end(true)"
                ]
            );
        }
    }

    #[test]
    fn start_and_end_reach_every_sink_even_after_a_stop() {
        let eager = RecordingHandler::shared(Some(1));
        let tail = RecordingHandler::shared(None);

        let mut chain = ChainedHandler::new(vec![as_sink(&eager), as_sink(&tail)]).unwrap();

        chain.start_rdf();
        assert!(!chain.handle_triple(&Triple::new(1, 2, 3)));
        chain.end_rdf(false);

        // The tail sink missed the fact but still gets both bookends.
        assert_eq!(tail.borrow().events, vec!["start", "end(false)"]);
    }

    #[test]
    fn a_chain_needs_at_least_two_sinks() {
        let only = RecordingHandler::shared(None);
        let result = ChainedHandler::new(vec![as_sink(&only)]);
        assert_eq!(
            result.err(),
            Some(ConstructionError::TooFewHandlers { minimum: 2, got: 1 })
        );

        let result = ChainedHandler::new(vec![]);
        assert_eq!(
            result.err(),
            Some(ConstructionError::TooFewHandlers { minimum: 2, got: 0 })
        );
    }

    #[test]
    fn a_chain_rejects_the_same_sink_twice() {
        let a = RecordingHandler::shared(None);
        let b = RecordingHandler::shared(None);
        let result = ChainedHandler::new(vec![as_sink(&a), as_sink(&b), as_sink(&a)]);
        assert_eq!(result.err(), Some(ConstructionError::DuplicateHandler));
    }

    #[test]
    fn distinct_sinks_of_the_same_type_are_fine() {
        let a = RecordingHandler::shared(None);
        let b = RecordingHandler::shared(None);
        let chain = ChainedHandler::new(vec![as_sink(&a), as_sink(&b)]).unwrap();
        assert_eq!(chain.inner_handlers().len(), 2);
    }
}
