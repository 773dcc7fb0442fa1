use std::io::{stdin, stdout, Write};

use anyhow::Context;
use cli_common::ParseError;
use lexer::{token::Token, Lexer};
use parser::{ast::Statement, Parser};
use tabled::Tabled;

pub const DEMO_QUERY: &str = "
SELECT
  productId,
  productType AS type,
  sellerName AS seller
FROM connections
WHERE
  saleCount > 1000 AND (totalViews > 10000 OR reviewCount > 100)
;
";

const HELP: &str = "Enter a statement such as `SELECT a, b AS c FROM t WHERE a > 1;`
Meta commands:
  .tokens <query>   print the token stream of a query
  .demo             parse the demonstration query
  .help             show this message
  .exit             leave the REPL";

#[derive(Debug, Clone)]
pub struct Options {
    pub show_tokens: bool,
    pub show_ast: bool,
    pub max_depth: usize,
}

pub struct Repl {
    options: Options,
}

#[derive(Debug)]
pub enum ReplResult {
    Exit,
    Help,
    RunDemo,
    NoInput,
    UnrecognisedInput,
    Tokens(String),
    Ok(CommandResult),
}

#[derive(Debug)]
pub enum CommandResult {
    ParseError(ParseError),
    Failed(String),
    Ok(Box<Statement>),
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResult::Ok(_))
    }
}

#[derive(Tabled)]
struct TokenRow {
    kind: String,
    text: String,
    start: usize,
    end: usize,
}

impl From<&Token> for TokenRow {
    fn from(token: &Token) -> Self {
        TokenRow {
            kind: token.kind.to_string(),
            text: token.text.clone(),
            start: token.span.start,
            end: token.span.end,
        }
    }
}

impl Repl {
    pub fn new(options: Options) -> Self {
        Repl { options }
    }

    pub fn run(&self) {
        println!("{HELP}");

        loop {
            Repl::print_prompt();

            let mut buf = String::new();
            match stdin().read_line(&mut buf) {
                Ok(0) => {
                    println!();
                    break;
                }
                Ok(_) => match self.handle_repl_command(&buf) {
                    ReplResult::Ok(command_result) => self.report(&command_result),
                    ReplResult::Help => println!("{HELP}"),
                    ReplResult::RunDemo => {
                        let command_result = self.eval_command(DEMO_QUERY);
                        self.report(&command_result);
                    }
                    ReplResult::Tokens(query) => match self.token_table(&query) {
                        Ok(table) => println!("{table}"),
                        Err(err) => println!("{err}"),
                    },
                    ReplResult::UnrecognisedInput => {
                        println!("Error! Command not recognised. Try .help");
                    }
                    ReplResult::Exit => {
                        println!("Goodbye.");
                        break;
                    }
                    ReplResult::NoInput => continue,
                },
                Err(err) => {
                    log::error!("Failed to read input: {err}");
                    break;
                }
            }
        }
    }

    pub fn eval_command(&self, input: &str) -> CommandResult {
        if self.options.show_tokens {
            match self.token_table(input) {
                Ok(table) => println!("{table}"),
                Err(err) => return CommandResult::ParseError(err),
            }
        }

        let parse_result = Parser::with_max_depth(Lexer::new(input), self.options.max_depth)
            .and_then(|mut parser| parser.parse());

        match parse_result {
            Ok(statement) => CommandResult::Ok(Box::new(statement)),
            Err(err) => {
                log::debug!("Parse failed: {err:?}");
                CommandResult::ParseError(err)
            }
        }
    }

    pub fn eval_file(&self, file: &str) -> CommandResult {
        match read_source(file) {
            Ok(file_content) => self.eval_command(&file_content),
            Err(err) => CommandResult::Failed(format!("{err:#}")),
        }
    }

    pub fn report(&self, command_result: &CommandResult) {
        match command_result {
            CommandResult::Ok(statement) => {
                if self.options.show_ast {
                    println!("{}", statement.outline());
                }
                println!("{statement}");
            }
            CommandResult::ParseError(err) => {
                eprintln!("{err}");
            }
            CommandResult::Failed(err) => {
                eprintln!("Program Error: {err}");
            }
        }
    }

    fn token_table(&self, input: &str) -> Result<String, ParseError> {
        let tokens = Lexer::new(input).lex()?;
        let rows: Vec<TokenRow> = tokens.iter().map(TokenRow::from).collect();

        Ok(tabled::Table::new(rows).to_string())
    }

    /// Handle user input via REPL. This will either eval a
    /// command or short-circuit for a meta command.
    fn handle_repl_command(&self, buf: &str) -> ReplResult {
        let fmt_buf = buf.trim();

        if Repl::is_meta_command(fmt_buf) {
            Repl::handle_meta_command(fmt_buf)
        } else if fmt_buf.is_empty() {
            ReplResult::NoInput
        } else {
            ReplResult::Ok(self.eval_command(fmt_buf))
        }
    }

    fn is_meta_command(buf: &str) -> bool {
        buf.starts_with('.')
    }

    fn handle_meta_command(buf: &str) -> ReplResult {
        let (command, rest) = match buf.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (buf, ""),
        };

        match command.to_lowercase().as_ref() {
            ".exit" | ".quit" => ReplResult::Exit,
            ".help" | ".h" | ".?" => ReplResult::Help,
            ".demo" => ReplResult::RunDemo,
            ".tokens" if !rest.is_empty() => ReplResult::Tokens(rest.to_string()),
            _ => ReplResult::UnrecognisedInput,
        }
    }

    fn print_prompt() {
        print!("> ");
        let _ = stdout().flush();
    }
}

fn read_source(file: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to open file {file}"))
}
