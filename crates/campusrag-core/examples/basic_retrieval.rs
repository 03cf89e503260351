// Basic retrieval example using campusrag as a library
//
// Works without an LLM service: embedding fails, so retrieval falls back to
// keyword search. Point CAMPUSRAG_LLM_URL at an OpenAI-compatible server to
// exercise the full pipeline.

use campusrag_core::{
    Config, HttpCompleter, HttpEmbedder, KnowledgeBase, LLMClient, NewFragment, RetrievalMode,
    RetrievalPipeline, VLLMClient,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> campusrag_core::Result<()> {
    println!("campusrag basic retrieval example\n");

    let db_path = std::env::temp_dir().join("campusrag_example.sqlite");
    println!("Opening knowledge base at: {}", db_path.display());
    let kb = Arc::new(KnowledgeBase::open(&db_path)?);
    kb.initialize()?;

    let fragments = [
        ("fees.pdf", "Fee structure for BSCS: PKR 171,350 per semester for national students"),
        ("net.html", "NET TEST SCHEDULE TABLE Series-3 Islamabad April 2026, Series-4 Karachi June 2026"),
        ("hostel.pdf", "Hostel accommodation is available for outstation students on merit"),
    ];
    for (source, content) in fragments {
        let inserted = kb.insert_fragment(NewFragment::new(content, source), None)?;
        println!("  {} {} ({})", if inserted.created { "+" } else { "=" }, inserted.id, source);
    }
    println!("Fragments: {}\n", kb.count_fragments()?);

    let config = Config::default();
    let client: Arc<dyn LLMClient> = Arc::new(VLLMClient::new(config.llm_service.clone())?);
    let pipeline = RetrievalPipeline::new(
        &config,
        Arc::new(HttpEmbedder::new(client.clone())),
        Arc::new(HttpCompleter::new(client)),
        kb.clone(),
        kb,
    )?;

    for query in ["BSCS fee structure", "When is NET Series-4 in Karachi?"] {
        let (context, report) = pipeline.retrieve_with_report(query, RetrievalMode::Fast).await?;
        println!("Query: {}", query);
        println!(
            "  {} retrieved, {} selected, {} ms",
            report.retrieved, report.selected, report.elapsed_ms
        );
        println!("{}\n", context);
    }

    Ok(())
}
