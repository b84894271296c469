use wakachi::{Analyzer, AnalyzerConfig, TokenModifiers};

fn main() {
    let mut analyzer = Analyzer::new();
    // Discovery walks mecab-config, the dicrc charset, and an empirical
    // probe; nothing here errors, initialize just reports the outcome.
    if !analyzer.initialize(AnalyzerConfig::default()) {
        eprintln!("morphological engine unavailable; install MeCab and a system dictionary");
        std::process::exit(1);
    }
    println!("engine charset: {}", analyzer.charset());

    let text = "吾輩は猫である。\n名前はまだ無い。";
    for token in analyzer.analyze(text) {
        let head = if token.modifiers.contains(TokenModifiers::SENTENCE_HEAD) {
            " [sentence-head]"
        } else {
            ""
        };
        println!(
            "{} @{}:{}..{} {:?} base={} reading={}{}",
            token.surface,
            token.line,
            token.start_char,
            token.end_char,
            token.token_type,
            token.base_form,
            token.reading,
            head
        );
    }
}
