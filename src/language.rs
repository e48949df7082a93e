//! The Yolang grammar
//!
//! Assembled from sections according to a [`Config`]: the start production
//! picks the entry point, and the array sections are included only in the
//! [`Dialect::Arrays`] dialect. Only the sections reachable from the entry
//! point are included.
//!
//! Every action named here has a handler in [`crate::parser::builder::registry`].

use crate::config::{Config, Dialect, Entry};
use crate::grammar::reader::{read_grammar, ReadError};
use crate::grammar::Grammar;

const PROGRAM: &str = "
<Program>        -> <FunctionList> EndOfFile
<FunctionList>   -> <Function> <FunctionList>
<FunctionList>   -> #Eps#
<Function>       -> Func Identifier {push_identifier} LeftParenthesis <ParamList> RightParenthesis <ReturnType> Colon <Statement> {function}
<ParamList>      -> <Param> <ParamTail>
<ParamList>      -> #Eps#
<ParamTail>      -> Comma <Param> <ParamTail>
<ParamTail>      -> #Eps#
<Param>          -> Identifier {push_identifier} Colon <Type> {param}
<ReturnType>     -> Arrow <Type> {return_type}
<ReturnType>     -> #Eps#
";

const STATEMENT_ENTRY: &str = "
<Start>          -> <Statement> EndOfFile
";

const EXPRESSION_ENTRY: &str = "
<Start>          -> <Expression> EndOfFile
";

const STATEMENTS: &str = "
<Statement>      -> Identifier {push_identifier} <IdentStatement>
<Statement>      -> If LeftParenthesis <Expression> RightParenthesis <Statement> {if_stmt} <OptionalElse>
<Statement>      -> While LeftParenthesis <Expression> RightParenthesis <Statement> {while_stmt}
<Statement>      -> Var Identifier {push_identifier} Colon <Type> <OptionalInit> {var_decl} Semicolon
<Statement>      -> Return <ReturnValue> {return_stmt} Semicolon
<Statement>      -> LeftCurly {open_block} <StatementList> RightCurly {close_block}
<Statement>      -> Print LeftParenthesis {open_args} <ArgList> RightParenthesis {print_stmt} Semicolon
<Statement>      -> Scan LeftParenthesis {open_args} <ArgList> RightParenthesis {scan_stmt} Semicolon
<IdentStatement> -> Assign <Expression> {assign_stmt} Semicolon
<IdentStatement> -> LeftParenthesis {open_args} <ArgList> RightParenthesis {call_stmt} Semicolon
<OptionalElse>   -> Else <Statement> {else_clause}
<OptionalElse>   -> #Eps#
<OptionalInit>   -> Assign <Expression> {init_expr}
<OptionalInit>   -> #Eps#
<ReturnValue>    -> <Expression> {return_expr}
<ReturnValue>    -> #Eps#
<StatementList>  -> <Statement> {block_item} <StatementList>
<StatementList>  -> #Eps#
";

const ARRAY_STATEMENTS: &str = "
<IdentStatement> -> LeftSquareBracket <Expression> RightSquareBracket {index_access} <IndexTail> Assign <Expression> {index_assign_stmt} Semicolon
";

const BASE_TYPES: &str = "
<BaseType>       -> Int {type_int}
<BaseType>       -> Float {type_float}
<BaseType>       -> Bool {type_bool}
<BaseType>       -> String {type_string}
";

const SCALAR_TYPES: &str = "
<Type>           -> <BaseType>
";

const ARRAY_TYPES: &str = "
<Type>           -> <BaseType> <TypeSuffix>
<TypeSuffix>     -> LeftSquareBracket RightSquareBracket {type_array} <TypeSuffix>
<TypeSuffix>     -> #Eps#
";

// one level per precedence tier, loosest first
const EXPRESSIONS: &str = "
<Expression>     -> <AndExpr> <OrTail>
<OrTail>         -> Or <AndExpr> {binary_or} <OrTail>
<OrTail>         -> #Eps#
<AndExpr>        -> <EqExpr> <AndTail>
<AndTail>        -> And <EqExpr> {binary_and} <AndTail>
<AndTail>        -> #Eps#
<EqExpr>         -> <RelExpr> <EqTail>
<EqTail>         -> Equals <RelExpr> {binary_eq} <EqTail>
<EqTail>         -> NotEquals <RelExpr> {binary_ne} <EqTail>
<EqTail>         -> #Eps#
<RelExpr>        -> <AddExpr> <RelTail>
<RelTail>        -> Less <AddExpr> {binary_lt} <RelTail>
<RelTail>        -> LessOrEquals <AddExpr> {binary_le} <RelTail>
<RelTail>        -> More <AddExpr> {binary_gt} <RelTail>
<RelTail>        -> MoreOrEquals <AddExpr> {binary_ge} <RelTail>
<RelTail>        -> #Eps#
<AddExpr>        -> <MulExpr> <AddTail>
<AddTail>        -> Plus <MulExpr> {binary_add} <AddTail>
<AddTail>        -> Minus <MulExpr> {binary_sub} <AddTail>
<AddTail>        -> #Eps#
<MulExpr>        -> <Unary> <MulTail>
<MulTail>        -> Mul <Unary> {binary_mul} <MulTail>
<MulTail>        -> Div <Unary> {binary_div} <MulTail>
<MulTail>        -> Mod <Unary> {binary_mod} <MulTail>
<MulTail>        -> #Eps#
<Unary>          -> Minus <Unary> {unary_minus}
<Unary>          -> Plus <Unary> {unary_plus}
<Unary>          -> Negation <Unary> {unary_not}
<Unary>          -> <Atom>
<Atom>           -> LeftParenthesis <Expression> RightParenthesis
<Atom>           -> IntegerConstant {push_int}
<Atom>           -> FloatConstant {push_float}
<Atom>           -> True {push_true}
<Atom>           -> False {push_false}
<Atom>           -> StringConstant {push_string}
<Atom>           -> Identifier {push_identifier} <IdentSuffix>
<IdentSuffix>    -> LeftParenthesis {open_args} <ArgList> RightParenthesis {call_expr}
<IdentSuffix>    -> #Eps#
<ArgList>        -> <Expression> {push_arg} <ArgTail>
<ArgList>        -> #Eps#
<ArgTail>        -> Comma <Expression> {push_arg} <ArgTail>
<ArgTail>        -> #Eps#
";

const ARRAY_EXPRESSIONS: &str = "
<Atom>           -> <ArrayLiteral>
<IdentSuffix>    -> LeftSquareBracket <Expression> RightSquareBracket {index_access} <IndexTail>
<IndexTail>      -> LeftSquareBracket <Expression> RightSquareBracket {extra_index} <IndexTail>
<IndexTail>      -> #Eps#
<ArrayLiteral>   -> LeftSquareBracket {open_array} <ArrayItems> RightSquareBracket {array_literal}
<ArrayItems>     -> <LiteralValue> {push_array_item} <ArrayItemTail>
<ArrayItems>     -> #Eps#
<ArrayItemTail>  -> Comma <LiteralValue> {push_array_item} <ArrayItemTail>
<ArrayItemTail>  -> #Eps#
<LiteralValue>   -> IntegerConstant {push_int}
<LiteralValue>   -> FloatConstant {push_float}
<LiteralValue>   -> True {push_true}
<LiteralValue>   -> False {push_false}
<LiteralValue>   -> StringConstant {push_string}
<LiteralValue>   -> <ArrayLiteral>
";

/// Grammar source for `config`, in the production authoring syntax.
pub fn grammar_text(config: &Config) -> String {
    let arrays = config.dialect == Dialect::Arrays;
    let mut sections = match config.entry {
        Entry::Program => vec![PROGRAM, STATEMENTS],
        Entry::Statement => vec![STATEMENT_ENTRY, STATEMENTS],
        Entry::Expression => vec![EXPRESSION_ENTRY],
    };
    if config.entry != Entry::Expression {
        if arrays {
            sections.push(ARRAY_STATEMENTS);
        }
        sections.push(BASE_TYPES);
        sections.push(if arrays { ARRAY_TYPES } else { SCALAR_TYPES });
    }
    sections.push(EXPRESSIONS);
    if arrays {
        sections.push(ARRAY_EXPRESSIONS);
    }
    sections.concat()
}

pub fn grammar(config: &Config) -> Result<Grammar, ReadError> {
    read_grammar(&grammar_text(config))
}
