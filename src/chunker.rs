//! 文本分块
//!
//! 按行把长文本切成不超过 `max_len` 个字符的分块。空行不单独成块，而是
//! 折算成相邻分块前后的换行数，[`reassemble`] 按这些计数重新插入 `'\n'`，
//! 因此分块都非空，且可以精确还原原文。

/// 一个连续的原文片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// 原文中位于此分块之前的换行数（只有第一个分块可能非零）
    pub breaks_before: usize,
    /// 原文中紧跟此分块的换行数（硬切的中间片段为 0）
    pub breaks_after: usize,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// 按段落（换行）分割文本，便于长文翻译
///
/// 逐行累积到缓冲区，拼接后长度超过 `max_len` 时先输出缓冲区。单行超过
/// `max_len` 时先输出缓冲区，再按固定字符数硬切，每段单独成块。长度按
/// `char` 计算，不会切断多字节字符。
///
/// 只由换行组成的文本没有可翻译的内容，返回空列表。
///
/// # 示例
///
/// ```rust
/// use google_translator::chunker::{reassemble, split_text_by_paragraphs};
///
/// let chunks = split_text_by_paragraphs("aaa\nbbb\ncc", 7);
/// let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, vec!["aaa\nbbb", "cc"]);
/// assert_eq!(reassemble(&chunks, &texts), "aaa\nbbb\ncc");
/// ```
pub fn split_text_by_paragraphs(text: &str, max_len: usize) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut splitter = Splitter::new(max_len.max(1));
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            splitter.gap += 1;
        }
        splitter.push_line(line);
    }
    splitter.finish()
}

/// 按分块的边界信息拼接各段（原文或译文）
///
/// `parts` 与 `chunks` 一一对应；换行只插在原文的换行处。
pub fn reassemble<S: AsRef<str>>(chunks: &[Chunk], parts: &[S]) -> String {
    let mut out = String::new();
    for (chunk, part) in chunks.iter().zip(parts) {
        push_breaks(&mut out, chunk.breaks_before);
        out.push_str(part.as_ref());
        push_breaks(&mut out, chunk.breaks_after);
    }
    out
}

fn push_breaks(out: &mut String, count: usize) {
    out.extend(std::iter::repeat('\n').take(count));
}

struct Splitter {
    max_len: usize,
    chunks: Vec<Chunk>,
    /// (内容, 字符数)；None 表示没有待输出的缓冲区
    current: Option<(String, usize)>,
    /// 尚未归属的换行数
    gap: usize,
    /// 第一个分块之前的换行数
    leading: usize,
}

impl Splitter {
    fn new(max_len: usize) -> Self {
        Self {
            max_len,
            chunks: Vec::new(),
            current: None,
            gap: 0,
            leading: 0,
        }
    }

    fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        let line_len = line.chars().count();

        if line_len > self.max_len {
            self.flush();
            self.place_gap();
            for piece in hard_slice(line, self.max_len) {
                self.emit(piece);
            }
            return;
        }

        match self.current.take() {
            Some((mut pending, pending_len)) if pending_len + self.gap + line_len <= self.max_len => {
                let joined_len = pending_len + self.gap + line_len;
                push_breaks(&mut pending, std::mem::take(&mut self.gap));
                pending.push_str(line);
                self.current = Some((pending, joined_len));
            }
            pending => {
                if let Some((text, _)) = pending {
                    self.emit(text);
                }
                self.place_gap();
                self.current = Some((line.to_string(), line_len));
            }
        }
    }

    fn emit(&mut self, text: String) {
        let breaks_before = if self.chunks.is_empty() {
            std::mem::take(&mut self.leading)
        } else {
            0
        };
        self.chunks.push(Chunk {
            text,
            breaks_before,
            breaks_after: 0,
        });
    }

    fn flush(&mut self) {
        if let Some((text, _)) = self.current.take() {
            self.emit(text);
        }
    }

    /// 把累计的换行挂到最后一个已输出分块之后，还没有分块时记为前导换行
    fn place_gap(&mut self) {
        let gap = std::mem::take(&mut self.gap);
        match self.chunks.last_mut() {
            Some(last) => last.breaks_after += gap,
            None => self.leading += gap,
        }
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.place_gap();
        self.chunks
    }
}

/// 按固定字符数切分，不考虑单词边界
fn hard_slice(line: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(max_len)
        .map(|piece| piece.iter().collect())
        .collect()
}
