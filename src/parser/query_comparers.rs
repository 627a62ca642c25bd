use crate::parser::WordComparer;

/// Words that end an expression or a FROM item and therefore can never be a bare alias.
pub const RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "COLLATE",
    "CONFLICT", "CROSS", "DEFAULT", "DESC", "DISTINCT", "DO", "ELSE", "END", "ESCAPE", "EXCEPT", "EXISTS",
    "FETCH", "FILTER", "FOR", "FROM", "FULL", "GROUP", "HAVING", "ILIKE", "IN", "INNER",
    "INTERSECT", "INTO", "IS", "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT",
    "NULL", "NULLS", "OFFSET", "ON", "OR", "ORDER", "OVER", "RETURNING", "RIGHT", "SELECT",
    "SET", "SIMILAR", "SOME", "TABLESAMPLE", "THEN", "UNION", "USING", "VALUES", "WHEN", "WHERE",
    "WINDOW", "WITH", "WITHIN",
];

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub distinct: WordComparer,
    pub all: WordComparer,
    pub from: WordComparer,
    pub r#where: WordComparer,
    pub group: WordComparer,
    pub by: WordComparer,
    pub having: WordComparer,
    pub order: WordComparer,
    pub limit: WordComparer,
    pub offset: WordComparer,
    pub fetch: WordComparer,
    pub r#for: WordComparer,
    pub window: WordComparer,
    pub union: WordComparer,
    pub intersect: WordComparer,
    pub except: WordComparer,
    pub alias: WordComparer,
    pub on: WordComparer,
    pub join: WordComparer,
    pub inner: WordComparer,
    pub left: WordComparer,
    pub right: WordComparer,
    pub full: WordComparer,
    pub outer: WordComparer,
    pub cross: WordComparer,
    pub natural: WordComparer,
    pub lateral: WordComparer,
    pub using: WordComparer,
    pub only: WordComparer,
    pub with: WordComparer,
    pub recursive: WordComparer,
    pub materialized: WordComparer,
    pub insert: WordComparer,
    pub into: WordComparer,
    pub values: WordComparer,
    pub default: WordComparer,
    pub update: WordComparer,
    pub set: WordComparer,
    pub delete: WordComparer,
    pub returning: WordComparer,
    pub conflict: WordComparer,
    pub constraint: WordComparer,
    pub r#do: WordComparer,
    pub nothing: WordComparer,
    pub explain: WordComparer,
    pub analyze: WordComparer,
    pub verbose: WordComparer,
    pub asc: WordComparer,
    pub desc: WordComparer,
    pub nulls: WordComparer,
    pub first: WordComparer,
    pub last: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub not: WordComparer,
    pub r#in: WordComparer,
    pub is: WordComparer,
    pub null: WordComparer,
    pub between: WordComparer,
    pub symmetric: WordComparer,
    pub like: WordComparer,
    pub ilike: WordComparer,
    pub similar: WordComparer,
    pub to: WordComparer,
    pub escape: WordComparer,
    pub b_true: WordComparer,
    pub b_false: WordComparer,
    pub unknown: WordComparer,
    pub case: WordComparer,
    pub when: WordComparer,
    pub then: WordComparer,
    pub r#else: WordComparer,
    pub end: WordComparer,
    pub cast: WordComparer,
    pub exists: WordComparer,
    pub any: WordComparer,
    pub some: WordComparer,
    pub array: WordComparer,
    pub row: WordComparer,
    pub extract: WordComparer,
    pub filter: WordComparer,
    pub over: WordComparer,
    pub partition: WordComparer,
    pub at: WordComparer,
    pub time: WordComparer,
    pub zone: WordComparer,
    pub collate: WordComparer,
    pub equal: WordComparer,
    pub not_equal_b: WordComparer, // basic
    pub not_equal_c: WordComparer, // c
    pub greater_than: WordComparer,
    pub greater_than_or_equal: WordComparer,
    pub less_than: WordComparer,
    pub less_than_or_equal: WordComparer,
    pub contains: WordComparer,
    pub contained_by: WordComparer,
    pub overlaps: WordComparer,
    pub regex_match: WordComparer,
    pub regex_match_ci: WordComparer,
    pub regex_not_match: WordComparer,
    pub regex_not_match_ci: WordComparer,
    pub double_colon: WordComparer,
    pub concat: WordComparer,
    pub json_get: WordComparer,
    pub json_get_text: WordComparer,
    pub json_path: WordComparer,
    pub json_path_text: WordComparer,
    pub plus: WordComparer,
    pub minus: WordComparer,
    pub star: WordComparer,
    pub slash: WordComparer,
    pub percent: WordComparer,
    pub caret: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT"),
            distinct: WordComparer::new("DISTINCT"),
            all: WordComparer::new("ALL"),
            from: WordComparer::new("FROM"),
            r#where: WordComparer::new("WHERE"),
            group: WordComparer::new("GROUP"),
            by: WordComparer::new("BY"),
            having: WordComparer::new("HAVING"),
            order: WordComparer::new("ORDER"),
            limit: WordComparer::new("LIMIT"),
            offset: WordComparer::new("OFFSET"),
            fetch: WordComparer::new("FETCH"),
            r#for: WordComparer::new("FOR"),
            window: WordComparer::new("WINDOW"),
            union: WordComparer::new("UNION"),
            intersect: WordComparer::new("INTERSECT"),
            except: WordComparer::new("EXCEPT"),
            alias: WordComparer::new("AS"),
            on: WordComparer::new("ON"),
            join: WordComparer::new("JOIN"),
            inner: WordComparer::new("INNER"),
            left: WordComparer::new("LEFT"),
            right: WordComparer::new("RIGHT"),
            full: WordComparer::new("FULL"),
            outer: WordComparer::new("OUTER"),
            cross: WordComparer::new("CROSS"),
            natural: WordComparer::new("NATURAL"),
            lateral: WordComparer::new("LATERAL"),
            using: WordComparer::new("USING"),
            only: WordComparer::new("ONLY"),
            with: WordComparer::new("WITH"),
            recursive: WordComparer::new("RECURSIVE"),
            materialized: WordComparer::new("MATERIALIZED"),
            insert: WordComparer::new("INSERT"),
            into: WordComparer::new("INTO"),
            values: WordComparer::new("VALUES"),
            default: WordComparer::new("DEFAULT"),
            update: WordComparer::new("UPDATE"),
            set: WordComparer::new("SET"),
            delete: WordComparer::new("DELETE"),
            returning: WordComparer::new("RETURNING"),
            conflict: WordComparer::new("CONFLICT"),
            constraint: WordComparer::new("CONSTRAINT"),
            r#do: WordComparer::new("DO"),
            nothing: WordComparer::new("NOTHING"),
            explain: WordComparer::new("EXPLAIN"),
            analyze: WordComparer::new("ANALYZE"),
            verbose: WordComparer::new("VERBOSE"),
            asc: WordComparer::new("ASC"),
            desc: WordComparer::new("DESC"),
            nulls: WordComparer::new("NULLS"),
            first: WordComparer::new("FIRST"),
            last: WordComparer::new("LAST"),
            and: WordComparer::new("AND"),
            or: WordComparer::new("OR"),
            not: WordComparer::new("NOT"),
            r#in: WordComparer::new("IN"),
            is: WordComparer::new("IS"),
            null: WordComparer::new("NULL"),
            between: WordComparer::new("BETWEEN"),
            symmetric: WordComparer::new("SYMMETRIC"),
            like: WordComparer::new("LIKE"),
            ilike: WordComparer::new("ILIKE"),
            similar: WordComparer::new("SIMILAR"),
            to: WordComparer::new("TO"),
            escape: WordComparer::new("ESCAPE"),
            b_true: WordComparer::new("TRUE"),
            b_false: WordComparer::new("FALSE"),
            unknown: WordComparer::new("UNKNOWN"),
            case: WordComparer::new("CASE"),
            when: WordComparer::new("WHEN"),
            then: WordComparer::new("THEN"),
            r#else: WordComparer::new("ELSE"),
            end: WordComparer::new("END"),
            cast: WordComparer::new("CAST"),
            exists: WordComparer::new("EXISTS"),
            any: WordComparer::new("ANY"),
            some: WordComparer::new("SOME"),
            array: WordComparer::new("ARRAY"),
            row: WordComparer::new("ROW"),
            extract: WordComparer::new("EXTRACT"),
            filter: WordComparer::new("FILTER"),
            over: WordComparer::new("OVER"),
            partition: WordComparer::new("PARTITION"),
            at: WordComparer::new("AT"),
            time: WordComparer::new("TIME"),
            zone: WordComparer::new("ZONE"),
            collate: WordComparer::new("COLLATE"),
            equal: WordComparer::new("=").without_postfix('>'),
            not_equal_b: WordComparer::new("<>"),
            not_equal_c: WordComparer::new("!="),
            greater_than: WordComparer::new(">").without_postfix('=').without_postfix('>'),
            greater_than_or_equal: WordComparer::new(">="),
            less_than: WordComparer::new("<").without_postfix('=').without_postfix('>').without_postfix('@').without_postfix('<'),
            less_than_or_equal: WordComparer::new("<="),
            contains: WordComparer::new("@>"),
            contained_by: WordComparer::new("<@"),
            overlaps: WordComparer::new("&&"),
            regex_match: WordComparer::new("~").without_postfix('*'),
            regex_match_ci: WordComparer::new("~*"),
            regex_not_match: WordComparer::new("!~").without_postfix('*'),
            regex_not_match_ci: WordComparer::new("!~*"),
            double_colon: WordComparer::new("::"),
            concat: WordComparer::new("||"),
            json_get: WordComparer::new("->").without_postfix('>'),
            json_get_text: WordComparer::new("->>"),
            json_path: WordComparer::new("#>").without_postfix('>'),
            json_path_text: WordComparer::new("#>>"),
            plus: WordComparer::new("+"),
            minus: WordComparer::new("-").without_postfix('-').without_postfix('>'),
            star: WordComparer::new("*"),
            slash: WordComparer::new("/").without_postfix('*'),
            percent: WordComparer::new("%"),
            caret: WordComparer::new("^"),
        }
    }

    pub fn is_reserved(word: &str) -> bool {
        RESERVED.iter().any(|reserved| reserved.eq_ignore_ascii_case(word))
    }
}
