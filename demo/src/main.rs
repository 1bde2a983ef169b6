use lexcore::default_kind::DefaultKind;
use lexcore::lexer::Lexer;

fn main() {
    tracing_subscriber::fmt::init();

    let source = "func main() { return 2320 + count * 3.5; } // trailing comment";
    let config = DefaultKind::lexer_config();
    let mut lexer = Lexer::new(source.as_bytes(), config);

    for token in &mut lexer {
        println!("{:?} {:?} @ {}", token.kind(), token.lexeme_str(), token.position());
    }

    if lexer.errors().is_empty() {
        return;
    }
    eprintln!("--- errors ---");
    for err in lexer.errors() {
        eprintln!("{err}");
    }
}
