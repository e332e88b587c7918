/// Roughly `size_kb` kilobytes of pMath source, one definition block after another.
#[allow(dead_code)]
pub fn generate_source(size_kb: usize) -> String {
    let base = r#"f[x_, y_] := Block({z:= x^2 + y^2},
    If(z > 10, "large", Sqrt(z) * {1, 2, 3}[[2]])
)
/* cached lookups */
table:= Table(i -> f(i, i + 1), i -> 1 .. 50)
g(list) := list.Map(Function(# * 2)) % doubled
"#;

    let target_bytes = size_kb * 1024;
    let mut content = String::new();
    let mut block = 0;

    while content.len() < target_bytes {
        content.push_str(&format!("section{block}:= {block} + 1\n"));
        content.push_str(base);
        block += 1;
    }

    content
}

/// A single statement nested `depth` fences deep.
#[allow(dead_code)]
pub fn generate_nested(depth: usize) -> String {
    format!("{}x{}", "(1 + ".repeat(depth), ")".repeat(depth))
}
