use wakachi::{Analyzer, AnalyzerConfig, ROOT_CHUNK_LINK};

fn main() {
    let mut analyzer = Analyzer::new();
    if !analyzer.initialize(AnalyzerConfig::default()) {
        eprintln!("morphological engine unavailable; install MeCab and a system dictionary");
        std::process::exit(1);
    }
    if !analyzer.has_dependency_capability() {
        eprintln!("CaboCha unavailable; dependency extraction is disabled on this instance");
        std::process::exit(1);
    }

    let text = "昨日買った本を友達に貸した。";
    println!("{text}");
    for chunk in analyzer.analyze_dependencies(text) {
        let head = if chunk.head_chunk_id == ROOT_CHUNK_LINK {
            "root".to_string()
        } else {
            format!("chunk {}", chunk.head_chunk_id)
        };
        println!(
            "chunk #{}: {} -> {} (score={:.3})",
            chunk.chunk_id, chunk.text, head, chunk.score
        );
    }
}
