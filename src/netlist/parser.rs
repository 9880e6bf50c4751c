//! Parser for the netlist format.

use std::collections::{HashMap, HashSet};

use super::ast::{is_ground_name, kind_from_name, ComponentDef, NetlistAst, GROUND_NODE};
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::components::ComponentKind;
use crate::error::{OhmlabError, Result};

/// Parser for netlist text.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();
        let mut names = HashSet::new();

        loop {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Eof => break,
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if !names.insert(component.name.to_ascii_uppercase()) {
                        return Err(OhmlabError::DuplicateComponent {
                            name: component.name,
                        });
                    }
                    ast.components.push(component);
                }
                TokenKind::Number | TokenKind::Equals => {
                    return Err(OhmlabError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }
            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => {
                self.advance()?;
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(OhmlabError::parse(
                self.current.line,
                format!("unexpected token: {:?}", self.current.text),
            )),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<f64> {
        if self.current.kind != TokenKind::Number {
            return Err(OhmlabError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text),
            ));
        }
        let tok = self.advance()?;
        parse_value(&tok.text)
            .ok_or_else(|| OhmlabError::parse(tok.line, format!("invalid number: {}", tok.text)))
    }

    fn parse_directive(&mut self, ast: &mut NetlistAst) -> Result<()> {
        let directive = self.advance()?;
        let line = directive.line;

        match directive.text.to_ascii_lowercase().as_str() {
            ".dt" => {
                let dt = self.expect_number("step length")?;
                if dt <= 0.0 {
                    return Err(OhmlabError::parse(line, format!("step length must be positive, got {}", dt)));
                }
                ast.dt = Some(dt);
            }
            ".steps" => {
                let steps = self.expect_number("step count")?;
                if steps < 0.0 || steps.fract() != 0.0 {
                    return Err(OhmlabError::parse(line, format!("step count must be a whole number, got {}", steps)));
                }
                ast.steps = Some(steps as usize);
            }
            other => {
                return Err(OhmlabError::parse(line, format!("unknown directive: {}", other)));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name_tok = self.advance()?;
        let line = name_tok.line;
        let name = name_tok.text;

        let kind = kind_from_name(&name).ok_or_else(|| OhmlabError::UnknownComponentType {
            component_type: name.clone(),
            line,
        })?;

        let expected_nodes = kind.port_count();
        let mut nodes = Vec::with_capacity(expected_nodes);
        while nodes.len() < expected_nodes {
            match self.current.kind {
                TokenKind::Identifier | TokenKind::Number => {
                    let tok = self.advance()?;
                    if is_ground_name(&tok.text) {
                        nodes.push(GROUND_NODE.to_string());
                    } else {
                        nodes.push(tok.text);
                    }
                }
                _ => {
                    return Err(OhmlabError::invalid_component(
                        &name,
                        line,
                        format!("expected {} nodes, got {}", expected_nodes, nodes.len()),
                    ));
                }
            }
        }

        let mut value = None;
        let mut params = HashMap::new();
        while !self.at_line_end() {
            match self.current.kind {
                TokenKind::Number => {
                    let v = self.expect_number("value")?;
                    if kind.default_value().is_none() {
                        return Err(OhmlabError::invalid_component(&name, line, "takes no value"));
                    }
                    if value.replace(v).is_some() {
                        return Err(OhmlabError::invalid_component(&name, line, "value given twice"));
                    }
                }
                TokenKind::Identifier => {
                    let key = self.advance()?.text.to_ascii_lowercase();
                    if self.current.kind != TokenKind::Equals {
                        return Err(OhmlabError::invalid_component(
                            &name,
                            line,
                            format!("unexpected '{}'", key),
                        ));
                    }
                    self.advance()?;
                    let v = self.expect_number("parameter value")?;
                    check_param(kind, &name, line, &key)?;
                    params.insert(key, v);
                }
                _ => {
                    return Err(OhmlabError::parse(
                        line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ComponentDef {
            kind,
            name,
            nodes,
            value,
            params,
            line,
        })
    }
}

/// Only capacitors take a parameter: `ic`, the initial voltage.
fn check_param(kind: ComponentKind, name: &str, line: usize, key: &str) -> Result<()> {
    match (kind, key) {
        (ComponentKind::Capacitor, "ic") => Ok(()),
        _ => Err(OhmlabError::invalid_component(
            name,
            line,
            format!("unknown parameter '{}'", key),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::parse;

    #[test]
    fn test_parse_resistor() {
        let ast = parse("R1 in out 10k").unwrap();
        assert_eq!(ast.components.len(), 1);
        assert_eq!(ast.components[0].kind, ComponentKind::Resistor);
        assert_eq!(ast.components[0].name, "R1");
        assert_eq!(ast.components[0].nodes, vec!["in", "out"]);
        assert_eq!(ast.components[0].value, Some(10_000.0));
    }

    #[test]
    fn test_parse_directives() {
        let ast = parse(".dt 5m\n.steps 250\nV1 a GND 9").unwrap();
        assert_eq!(ast.dt, Some(0.005));
        assert_eq!(ast.steps, Some(250));
        assert_eq!(ast.components[0].nodes, vec!["a", "0"]);
    }

    #[test]
    fn test_parse_defaults_and_params() {
        let ast = parse("C1 cap 0 ic=2.5\nPA1 cap 0\nG1 0").unwrap();
        let cap = &ast.components[0];
        assert_eq!(cap.value, None);
        assert_eq!(cap.params["ic"], 2.5);
        assert_eq!(ast.components[1].kind, ComponentKind::ProbeA);
        assert_eq!(ast.components[2].nodes, vec!["0"]);
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# This is a comment\nR1 in out 1k ; inline comment style\n\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.components.len(), 1);
    }

    #[test]
    fn test_numeric_node_names() {
        let ast = parse("R1 1 2 100").unwrap();
        assert_eq!(ast.components[0].nodes, vec!["1", "2"]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("Q1 a b c").unwrap_err(),
            OhmlabError::UnknownComponentType { line: 1, .. }
        ));
        assert!(matches!(
            parse("R1 a\n").unwrap_err(),
            OhmlabError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("R1 a b 1k\nr1 b 0 1k").unwrap_err(),
            OhmlabError::DuplicateComponent { .. }
        ));
        assert!(matches!(
            parse("PA1 a 0 5").unwrap_err(),
            OhmlabError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("R1 a 0 1k ic=3").unwrap_err(),
            OhmlabError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse(".tran 1m").unwrap_err(),
            OhmlabError::ParseError { line: 1, .. }
        ));
        assert!(matches!(
            parse("\n.dt 0").unwrap_err(),
            OhmlabError::ParseError { line: 2, .. }
        ));
        assert!(parse(".steps 2.5").is_err());
    }
}
