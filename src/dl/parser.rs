//! Tokenizer and recursive-descent parser for the prefix-notation ontology
//! language (`Ontology( Declaration(Class(C)) SubClassOf(C D) ... )`).
//! Ported from `examples/original_source/parser.go`'s `preProc`/`parse`,
//! which runs a regex preprocessing pass over whitespace-delimited tokens;
//! this instead tokenizes directly, keeping `Name(` glued to its opening
//! paren and `)` isolated, which is what that preprocessing pass achieves.

use super::ast::Predicate;

fn tokenize(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buf = String::new();

    for c in source.chars() {
        if c.is_whitespace() {
            if !buf.is_empty() {
                tokens.push(std::mem::take(&mut buf));
            }
        } else if c == '(' {
            buf.push(c);
            tokens.push(std::mem::take(&mut buf));
        } else if c == ')' {
            if !buf.is_empty() {
                tokens.push(std::mem::take(&mut buf));
            }
            tokens.push(")".to_string());
        } else {
            buf.push(c);
        }
    }
    if !buf.is_empty() {
        tokens.push(buf);
    }

    tokens
}

fn is_predicate_head(token: &str) -> bool {
    token.len() > 1 && token.ends_with('(')
}

struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a str> {
        let tok = self.tokens.get(self.pos).map(|s| s.as_str());
        self.pos += 1;
        tok
    }
}

fn parse_predicate(cursor: &mut Cursor, name: &str) -> Predicate {
    let mut result = Predicate {
        name: name.to_string(),
        arguments: Vec::new(),
    };

    let mut child = Predicate::leaf("");
    let mut token = cursor.next();

    while let Some(t) = token {
        if t == ")" {
            break;
        }

        if is_predicate_head(t) {
            let child_name = &t[..t.len() - 1];
            child = parse_predicate(cursor, child_name);
        } else if t.starts_with('"') {
            let mut value = t.to_string();
            while !value.ends_with('"') {
                match cursor.next() {
                    Some(next) => {
                        value.push(' ');
                        value.push_str(next);
                    }
                    None => break,
                }
            }
            child = Predicate::leaf(value);
        } else {
            child = Predicate::leaf(t);
        }

        result.arguments.push(child.clone());
        token = cursor.next();
    }

    result
}

/// Parses an entire ontology document into its (anonymous) root predicate.
/// Use `Predicate::find_ontology` on the result to reach the `Ontology(...)`
/// node itself.
pub fn parse(source: &str) -> Predicate {
    let tokens = tokenize(source);
    let mut cursor = Cursor { tokens: &tokens, pos: 0 };
    parse_predicate(&mut cursor, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_declaration() {
        let doc = "Ontology( Declaration(Class(C)) SubClassOf(C D) )";
        let root = parse(doc);
        let ontology = root.find_ontology().unwrap();
        assert_eq!(ontology.arguments.len(), 2);

        let declaration = &ontology.arguments[0];
        assert_eq!(declaration.name, "Declaration");
        let class = &declaration.arguments[0];
        assert_eq!(class.name, "Class");
        assert_eq!(class.arguments[0].name, "C");

        let sub_class_of = &ontology.arguments[1];
        assert_eq!(sub_class_of.name, "SubClassOf");
        assert_eq!(sub_class_of.arguments[0].name, "C");
        assert_eq!(sub_class_of.arguments[1].name, "D");
    }

    #[test]
    fn reassembles_quoted_multi_word_strings() {
        let doc = r#"Ontology( ClassAssertion(C "hello world") )"#;
        let root = parse(doc);
        let ontology = root.find_ontology().unwrap();
        let assertion = &ontology.arguments[0];
        assert_eq!(assertion.arguments[1].name, "\"hello world\"");
    }
}
