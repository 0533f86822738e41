//! Scripted transport for tests

use crate::core::error::LoaderError;
use crate::core::traits::Transport;
use reqwest::Method;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// One call received by [`FakeTransport`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub file: Option<PathBuf>,
}

enum Reply {
    Json(Value),
    Status(u16),
}

/// Answers from per-route queues and records every call
///
/// The last reply of a route is repeated, so reloads of the same `self`
/// link need to be scripted only once.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: RefCell<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, url: &str, reply: Value) -> &Self {
        self.push(method, url, Reply::Json(reply))
    }

    pub fn fail(&self, method: Method, url: &str, status: u16) -> &Self {
        self.push(method, url, Reply::Status(status))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, method: &Method, url: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| &c.method == method && c.url == url)
            .count()
    }

    pub fn bodies(&self, method: &Method, url: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| &c.method == method && c.url == url)
            .filter_map(|c| c.body.clone())
            .collect()
    }

    fn push(&self, method: Method, url: &str, reply: Reply) -> &Self {
        self.routes
            .borrow_mut()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    fn answer(&self, call: Call) -> Result<Value, LoaderError> {
        let method = call.method.clone();
        let url = call.url.clone();
        self.calls.borrow_mut().push(call);

        let mut routes = self.routes.borrow_mut();
        let queue = routes.get_mut(&(method.clone(), url.clone()));
        let reply = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().map(|reply| match reply {
                Reply::Json(value) => Reply::Json(value.clone()),
                Reply::Status(status) => Reply::Status(*status),
            }),
            None => None,
        };

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(LoaderError::Transport {
                method: method.to_string(),
                url,
                status: Some(status),
                message: format!("HTTP {}", status),
            }),
            None => Err(LoaderError::Transport {
                method: method.to_string(),
                url,
                status: Some(404),
                message: "no route scripted".to_string(),
            }),
        }
    }
}

impl Transport for FakeTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, LoaderError> {
        self.answer(Call {
            method,
            url: url.to_string(),
            body: body.cloned(),
            file: None,
        })
    }

    fn upload(&self, method: Method, url: &str, file: &Path) -> Result<Value, LoaderError> {
        self.answer(Call {
            method,
            url: url.to_string(),
            body: None,
            file: Some(file.to_path_buf()),
        })
    }
}
