use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::client::RequestClient;
use crate::inputs::{QueryInputs, Variables};

type Reply = Result<Value, String>;

enum Scripted {
    Ready(Reply),
    Pending(oneshot::Receiver<Reply>),
}

/// Request client answering from a queue of scripted replies and recording
/// every call it receives.
#[derive(Default)]
pub struct ScriptedClient {
    calls: Mutex<Vec<QueryInputs>>,
    replies: Mutex<VecDeque<Scripted>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(Scripted::Ready(reply));
    }

    /// Queues a reply that settles only when the returned sender fires.
    pub fn pending(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Scripted::Pending(rx));
        tx
    }

    pub fn calls(&self) -> Vec<QueryInputs> {
        self.calls.lock().unwrap().clone()
    }
}

impl RequestClient for ScriptedClient {
    type Error = String;

    fn request<'a>(
        &'a self,
        query: &'a str,
        variables: Option<&'a Variables>,
    ) -> BoxFuture<'a, Result<Value, String>> {
        self.calls
            .lock()
            .unwrap()
            .push(QueryInputs::new(query, variables.cloned()));
        let next = self.replies.lock().unwrap().pop_front();

        async move {
            match next {
                Some(Scripted::Ready(reply)) => reply,
                Some(Scripted::Pending(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err("reply dropped".to_string())),
                None => Err("no scripted reply".to_string()),
            }
        }
        .boxed()
    }
}

pub fn vars(value: Value) -> Option<Variables> {
    value.as_object().cloned()
}
