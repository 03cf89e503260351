//! Shared scripted collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use campusrag_core::{
    CampusRagError, CompletionParams, Embedder, KnowledgeBase, NewFragment, Result, TextCompleter,
};
use std::sync::Mutex;

pub const DIMENSIONS: usize = 64;

/// Bag-of-words embedder: texts sharing words land close together
pub struct WordHashEmbedder;

fn word_bucket(word: &str) -> usize {
    word.bytes()
        .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
        % DIMENSIONS
}

#[async_trait]
impl Embedder for WordHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[word_bucket(&word.to_lowercase())] += 1.0;
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
        DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "word-hash"
    }
}

type Script = Box<dyn Fn(&str, CompletionParams) -> Result<String> + Send + Sync>;

/// Completer answering from a closure and counting calls
pub struct ScriptedCompleter {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    pub fn new(script: impl Fn(&str, CompletionParams) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::new(|_, _| Err(CampusRagError::Llm("completion service unavailable".to_string())))
    }

    /// Plausible answers for every prompt the pipeline sends
    pub fn cooperative() -> Self {
        Self::new(|prompt, _| {
            Ok(if prompt.starts_with("Classify") {
                "FACTUAL".to_string()
            } else if prompt.starts_with("Given the user query") {
                "- tuition for computer science\n- BSCS semester charges".to_string()
            } else if prompt.starts_with("Rate the relevance") {
                if prompt.contains("PKR") { "9" } else { "4" }.to_string()
            } else if prompt.starts_with("Given this question") {
                "The BSCS fee is PKR 171,350 per semester.".to_string()
            } else if prompt.starts_with("You are a context compression expert") {
                "BSCS: PKR 171,350 per semester".to_string()
            } else {
                "7".to_string()
            })
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.script)(prompt, params)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub const CORPUS: &[(&str, &str)] = &[
    ("fees.pdf", "Fee structure for BSCS: PKR 171,350 per semester for national students in Engineering Computing"),
    ("fees.pdf", "Fee structure for BBA: PKR 145,000 per semester for national students in Business Studies"),
    ("net.html", "NET TEST SCHEDULE TABLE Series-3 Islamabad April 2026, Series-4 Karachi June 2026"),
    ("net.html", "NET Series registration opens two weeks before each test date"),
    ("eligibility.html", "Eligibility criteria for BSCS: 60% marks in FSc Pre-Engineering or ICS"),
    ("hostel.pdf", "Hostel accommodation is available for outstation students on merit"),
    ("results.html", "Result NET-2026 Series-3 will be announced on the NET portal"),
    ("math.html", "Students without mathematics must complete a deficiency maths course in the first year"),
];

/// Knowledge base filled with `CORPUS`, embedded with `WordHashEmbedder`
pub async fn seeded_knowledge_base(kb: &KnowledgeBase) {
    kb.initialize().unwrap();
    for (source, content) in CORPUS {
        let embedding = WordHashEmbedder.embed(content).await.unwrap();
        kb.insert_fragment(NewFragment::new(*content, *source), Some(embedding.as_slice()))
            .unwrap();
    }
}
