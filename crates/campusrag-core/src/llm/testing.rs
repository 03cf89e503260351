//! Scripted collaborators for unit tests

use super::{CompletionParams, Embedder, TextCompleter};
use crate::error::{CampusRagError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

type Script = Box<dyn Fn(&str, CompletionParams) -> Result<String> + Send + Sync>;

/// Completer answering from a closure and recording every call
pub struct ScriptedCompleter {
    script: Script,
    pub calls: Mutex<Vec<(String, CompletionParams)>>,
}

impl ScriptedCompleter {
    pub fn new(script: impl Fn(&str, CompletionParams) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_, _| Ok(reply.clone()))
    }

    pub fn failing() -> Self {
        Self::new(|_, _| Err(CampusRagError::Llm("service unavailable".to_string())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_params(&self) -> Option<CompletionParams> {
        self.calls.lock().unwrap().last().map(|(_, p)| *p)
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String> {
        self.calls.lock().unwrap().push((prompt.to_string(), params));
        (self.script)(prompt, params)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Embedder mapping text to a fixed-width bag-of-bytes vector
pub struct HashingEmbedder;

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 16];
        for byte in text.to_lowercase().bytes() {
            vector[(byte % 16) as usize] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        16
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}
