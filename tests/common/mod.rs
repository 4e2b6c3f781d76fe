//! In-memory Slack collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use slack_mcp_server::handlers::{self, Dispatcher};
use slack_mcp_server::protocol::{JsonRpcRequest, RpcId};
use slack_mcp_server::slack::{MessageSender, PostedMessage, SlackError, UserDirectory};

pub const POSTED_TS: &str = "1700000000.000100";
pub const RESOLVED_USER: &str = "U0123ABCD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub destination: String,
    pub text: String,
    pub thread_ts: Option<String>,
}

/// Records posts; lookups and posts fail on demand.
#[derive(Default)]
pub struct FakeSlack {
    pub fail_lookup: bool,
    pub fail_post: Option<String>,
    pub lookups: Mutex<Vec<String>>,
    pub posts: Mutex<Vec<Post>>,
}

impl FakeSlack {
    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserDirectory for FakeSlack {
    async fn resolve_by_email(&self, email: &str) -> Result<String, SlackError> {
        self.lookups.lock().unwrap().push(email.to_string());
        if self.fail_lookup {
            Err(SlackError::UserNotFound(email.to_string()))
        } else {
            Ok(RESOLVED_USER.to_string())
        }
    }
}

#[async_trait]
impl MessageSender for FakeSlack {
    async fn post(
        &self,
        destination: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage, SlackError> {
        if let Some(error) = &self.fail_post {
            return Err(SlackError::Api(error.clone()));
        }
        self.posts.lock().unwrap().push(Post {
            destination: destination.to_string(),
            text: text.to_string(),
            thread_ts: thread_ts.map(str::to_string),
        });
        Ok(PostedMessage {
            channel: destination.to_string(),
            ts: Some(POSTED_TS.to_string()),
        })
    }
}

pub fn dispatcher(slack: &Arc<FakeSlack>) -> Dispatcher {
    let registry = handlers::default_registry(slack.clone(), slack.clone()).unwrap();
    Dispatcher::new(registry)
}

pub fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::from(id)),
        method: method.into(),
        params,
    }
}

pub fn notification(method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: None,
        method: method.into(),
        params,
    }
}
