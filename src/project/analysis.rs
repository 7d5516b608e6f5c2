//! 逐行正则的源码结构提取
//!
//! 按扩展名识别语言，用各语言的声明模式提取函数 / 类型 / 导入。
//! 这是启发式分析，不是完整解析器：嵌套、宏展开、多行签名等不保证覆盖。

use std::path::Path;

use regex::Regex;

/// 支持结构提取的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Unknown,
}

/// 按扩展名识别语言
pub fn detect_language(path: &Path) -> Language {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "py" => Language::Python,
        "rs" => Language::Rust,
        "js" | "jsx" => Language::JavaScript,
        "ts" | "tsx" => Language::TypeScript,
        _ => Language::Unknown,
    }
}

/// 函数声明
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub name: String,
    pub line: usize,
    pub args: Vec<String>,
}

/// 类型声明（class / struct / enum / trait）及其方法
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: String,
    pub line: usize,
    pub methods: Vec<String>,
}

/// 单文件结构分析结果
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub path: String,
    pub lines: usize,
    pub functions: Vec<FunctionInfo>,
    pub types: Vec<TypeInfo>,
    pub imports: Vec<String>,
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|a| {
            // 去掉类型标注与默认值，只留参数名
            a.split(':')
                .next()
                .unwrap_or("")
                .split('=')
                .next()
                .unwrap_or("")
                .trim()
                .trim_start_matches("&mut ")
                .trim_start_matches('&')
                .to_string()
        })
        .filter(|a| !a.is_empty())
        .collect()
}

/// 对文件内容做逐行结构提取
pub fn analyze_source(path: &str, content: &str, lang: Language) -> FileAnalysis {
    let (fn_re, type_re, import_re) = match lang {
        Language::Python => (
            Regex::new(r"^(\s*)def\s+(\w+)\s*\(([^)]*)").unwrap(),
            Regex::new(r"^class\s+(\w+)").unwrap(),
            Regex::new(r"^(?:import\s+([\w.]+)|from\s+([\w.]+)\s+import)").unwrap(),
        ),
        Language::Rust => (
            Regex::new(r"^(\s*)(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?fn\s+(\w+)[^(]*\(([^)]*)")
                .unwrap(),
            Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+(\w+)").unwrap(),
            Regex::new(r"^\s*use\s+([\w:]+)").unwrap(),
        ),
        Language::JavaScript | Language::TypeScript => (
            Regex::new(r"^(\s*)(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\(([^)]*)").unwrap(),
            Regex::new(r"^(?:export\s+)?(?:abstract\s+)?(?:class|interface)\s+(\w+)").unwrap(),
            Regex::new(r#"^import\s+.*?from\s+['"]([^'"]+)['"]"#).unwrap(),
        ),
        Language::Unknown => {
            return FileAnalysis {
                path: path.to_string(),
                lines: content.lines().count(),
                functions: Vec::new(),
                types: Vec::new(),
                imports: Vec::new(),
            }
        }
    };

    let mut functions = Vec::new();
    let mut types: Vec<TypeInfo> = Vec::new();
    let mut imports = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(c) = type_re.captures(line) {
            types.push(TypeInfo {
                name: c[1].to_string(),
                line: line_no,
                methods: Vec::new(),
            });
            continue;
        }

        if let Some(c) = fn_re.captures(line) {
            let indented = !c[1].is_empty();
            let name = c[2].to_string();
            let args = split_args(c.get(3).map(|m| m.as_str()).unwrap_or(""));
            // 缩进的声明挂到最近的类型上作为方法，顶层的记为自由函数
            if indented {
                if let Some(t) = types.last_mut() {
                    t.methods.push(name);
                    continue;
                }
            }
            functions.push(FunctionInfo {
                name,
                line: line_no,
                args,
            });
            continue;
        }

        if let Some(c) = import_re.captures(line) {
            let import = c
                .get(1)
                .or_else(|| c.get(2))
                .map(|m| m.as_str().to_string());
            if let Some(i) = import {
                imports.push(i);
            }
        }
    }

    FileAnalysis {
        path: path.to_string(),
        lines: content.lines().count(),
        functions,
        types,
        imports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_extraction() {
        let src = "import os\nfrom pathlib import Path\n\nclass Parser:\n    def parse(self, text):\n        pass\n\ndef main(argv):\n    pass\n";
        let a = analyze_source("m.py", src, Language::Python);
        assert_eq!(a.types.len(), 1);
        assert_eq!(a.types[0].name, "Parser");
        assert_eq!(a.types[0].methods, vec!["parse"]);
        assert_eq!(a.functions.len(), 1);
        assert_eq!(a.functions[0].name, "main");
        assert_eq!(a.functions[0].args, vec!["argv"]);
        assert_eq!(a.imports, vec!["os", "pathlib"]);
    }

    #[test]
    fn test_rust_extraction() {
        let src = "use std::fs;\n\npub struct Config;\n\npub fn load(path: &str) -> Config {\n    Config\n}\n";
        let a = analyze_source("m.rs", src, Language::Rust);
        assert_eq!(a.types[0].name, "Config");
        assert_eq!(a.functions[0].name, "load");
        assert_eq!(a.functions[0].args, vec!["path"]);
        assert_eq!(a.imports, vec!["std::fs"]);
    }

    #[test]
    fn test_unknown_language_yields_line_count_only() {
        let a = analyze_source("notes.txt", "a\nb\n", Language::Unknown);
        assert_eq!(a.lines, 2);
        assert!(a.functions.is_empty());
        assert!(a.types.is_empty());
    }
}
