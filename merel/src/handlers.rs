/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::RefCell;
use std::rc::Rc;
use shared::triple::Triple;
use crate::errors::ConstructionError;

/// An event sink fed by a streaming producer. The per-fact and
/// per-declaration calls return `false` to ask the producer to stop;
/// `start_rdf`/`end_rdf` bracket the stream unconditionally.
pub trait RdfHandler {
    fn start_rdf(&mut self);

    fn end_rdf(&mut self, ok: bool);

    fn handle_triple(&mut self, triple: &Triple) -> bool;

    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> bool;

    fn handle_base(&mut self, iri: &str) -> bool;
}

pub type SharedHandler = Rc<RefCell<dyn RdfHandler>>;

const MIN_HANDLERS: usize = 2;

/// Forwards every event to a sequence of sinks in order. Per-fact
/// forwarding stops at the first sink that signals stop and propagates
/// that signal; start and end notifications always reach every sink.
pub struct ChainedHandler {
    handlers: Vec<SharedHandler>,
}

impl ChainedHandler {
    /// Fails when fewer than two sinks are given or any two entries are
    /// the same instance.
    pub fn new(handlers: Vec<SharedHandler>) -> Result<Self, ConstructionError> {
        if handlers.len() < MIN_HANDLERS {
            return Err(ConstructionError::TooFewHandlers {
                minimum: MIN_HANDLERS,
                got: handlers.len(),
            });
        }
        for i in 0..handlers.len() {
            for j in (i + 1)..handlers.len() {
                if Rc::ptr_eq(&handlers[i], &handlers[j]) {
                    return Err(ConstructionError::DuplicateHandler);
                }
            }
        }
        Ok(ChainedHandler { handlers })
    }

    pub fn inner_handlers(&self) -> &[SharedHandler] {
        &self.handlers
    }
}

impl RdfHandler for ChainedHandler {
    fn start_rdf(&mut self) {
        for handler in &self.handlers {
            handler.borrow_mut().start_rdf();
        }
    }

    fn end_rdf(&mut self, ok: bool) {
        for handler in &self.handlers {
            handler.borrow_mut().end_rdf(ok);
        }
    }

    fn handle_triple(&mut self, triple: &Triple) -> bool {
        self.handlers
            .iter()
            .all(|handler| handler.borrow_mut().handle_triple(triple))
    }

    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> bool {
        self.handlers
            .iter()
            .all(|handler| handler.borrow_mut().handle_namespace(prefix, iri))
    }

    fn handle_base(&mut self, iri: &str) -> bool {
        self.handlers
            .iter()
            .all(|handler| handler.borrow_mut().handle_base(iri))
    }
}
