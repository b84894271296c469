use wakachi::split_into_sentences;

fn main() {
    let text = "今日は晴れです。明日は雨でしょう！\n「続きは？」まだ未定";
    for (index, boundary) in split_into_sentences(text).iter().enumerate() {
        println!(
            "sentence #{index}: [{}..{}] {}",
            boundary.begin,
            boundary.end,
            &text[boundary.begin..boundary.end]
        );
    }
}
