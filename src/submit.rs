//! Submission controller - gates a search behind validation and encodes it

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::FieldCatalog;
use crate::codec::{encode, to_query_string, Param};
use crate::query::{validate, SearchExpression, ValidationReport};

/// How the encoded search reaches the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Get,
    Post,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Get => f.write_str("GET"),
            Transport::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Encoding,
    /// Navigation is expected; the controller stays here
    Submitted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    InFlight,

    #[error("search has {count} problem(s):\n{0}", count = .0.len())]
    Blocked(ValidationReport),
}

/// The form navigation to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub transport: Transport,
    pub action: String,
    pub params: Vec<Param>,
}

impl Submission {
    /// Target URL; carries the parameters for GET
    pub fn url(&self) -> String {
        match self.transport {
            Transport::Get if !self.params.is_empty() => {
                format!("{}?{}", self.action, to_query_string(&self.params))
            }
            _ => self.action.clone(),
        }
    }

    /// Form body for POST
    pub fn body(&self) -> Option<String> {
        match self.transport {
            Transport::Post => Some(to_query_string(&self.params)),
            Transport::Get => None,
        }
    }
}

/// Runs `Idle -> Validating -> (Blocked -> Idle | Encoding -> Submitted)`.
///
/// The submit button is disabled while validating and stays disabled once
/// submitted, so a second click cannot send the search twice.
#[derive(Debug)]
pub struct SubmitController {
    action: String,
    transport: Transport,
    state: SubmitState,
    submit_enabled: bool,
}

impl SubmitController {
    pub fn new(action: impl Into<String>, transport: Transport) -> Self {
        SubmitController {
            action: action.into(),
            transport,
            state: SubmitState::Idle,
            submit_enabled: true,
        }
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Validate then encode. On violations the controller returns to idle
    /// with the button re-enabled and nothing is encoded.
    pub fn submit(
        &mut self,
        expr: &mut SearchExpression,
        catalog: &FieldCatalog,
    ) -> Result<Submission, SubmitError> {
        if self.state != SubmitState::Idle {
            return Err(SubmitError::InFlight);
        }

        self.state = SubmitState::Validating;
        self.submit_enabled = false;

        if let Err(report) = validate(expr, catalog) {
            info!(violations = report.len(), "search blocked by validation");
            self.re_enable();
            return Err(SubmitError::Blocked(report));
        }

        self.state = SubmitState::Encoding;
        let params = encode(expr);

        self.state = SubmitState::Submitted;
        debug!(transport = %self.transport, action = %self.action, "search submitted");

        Ok(Submission {
            transport: self.transport,
            action: self.action.clone(),
            params,
        })
    }

    /// Return to idle with the button enabled. Safe to call repeatedly, e.g.
    /// when the page is restored after a navigation that did not happen.
    pub fn re_enable(&mut self) {
        self.state = SubmitState::Idle;
        self.submit_enabled = true;
    }
}
