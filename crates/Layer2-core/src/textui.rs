//! TextUi - CLI 출력 collaborator
//!
//! `Command::output_for_cli()`는 결과를 직접 출력하지 않고 이 trait를 통해 출력한다.
//!
//! ```text
//! -----------
//! show-items:
//! -----------
//!   city = 'Berlin'
//!   fruit = 'apple'
//! -------
//! 2 items
//! -------
//! ```

use plexus_foundation::Result;
use serde_json::Value;
use std::io::{self, Write};

/// 텍스트 출력 인터페이스
pub trait TextUi {
    /// 한 줄 그대로 출력
    fn print_plain(&mut self, text: &str) -> Result<()>;

    /// 명령 이름 제목 (`_`는 `-`로 바뀌고 `:`가 붙는다)
    fn print_name(&mut self, name: &str) -> Result<()> {
        self.print_dashed(&format!("{}:", name.replace('_', "-")))
    }

    /// `  key = value` 목록
    fn print_keyval(&mut self, rows: &[(String, Value)]) -> Result<()> {
        for (key, value) in rows {
            self.print_plain(&format!("  {} = {}", key, display_value(value)))?;
        }
        Ok(())
    }

    /// 개수 요약 (`format`의 `{count}`가 개수로 치환된다)
    fn print_count(&mut self, count: usize, format: &str) -> Result<()> {
        self.print_dashed(&format.replace("{count}", &count.to_string()))
    }

    /// 텍스트 위아래에 같은 길이의 `-` 줄
    fn print_dashed(&mut self, text: &str) -> Result<()> {
        let dashes = "-".repeat(text.chars().count());
        self.print_plain(&dashes)?;
        self.print_plain(text)?;
        self.print_plain(&dashes)
    }
}

/// 값 표시 형식 (문자열은 작은따옴표)
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// ConsoleUi
// ============================================================================

/// `Write` 대상에 출력하는 TextUi
pub struct ConsoleUi<W: Write> {
    out: W,
}

impl<W: Write> ConsoleUi<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleUi<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextUi for ConsoleUi<W> {
    fn print_plain(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }
}
