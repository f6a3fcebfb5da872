// 测试公共工具
//
// 提供可编程的翻译后端、记录进度事件的 sink 以及本地脚本化 HTTP 服务。

use async_trait::async_trait;
use google_translator::{
    CancellationToken, ChunkTranslation, ChunkTranslator, ProgressSink, Result,
    TranslationError,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 把分块转为大写的假后端，记录调用次数
pub struct MockTranslator {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
    max_len: usize,
    cancel_on_call: Option<(usize, CancellationToken)>,
    fail_on_call: Option<usize>,
    detected: Option<String>,
}

impl MockTranslator {
    pub fn new(max_len: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            max_len,
            cancel_on_call: None,
            fail_on_call: None,
            detected: None,
        }
    }

    /// 在第 `call` 次调用期间触发取消（调用本身仍然成功）
    pub fn cancel_during(mut self, call: usize, handle: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, handle));
        self
    }

    pub fn fail_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn detecting(mut self, code: &str) -> Self {
        self.detected = Some(code.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChunkTranslator for MockTranslator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn max_chunk_len(&self) -> usize {
        self.max_len
    }

    async fn translate_chunk(
        &self,
        chunk: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<ChunkTranslation> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen.lock().unwrap().push(chunk.to_string());

        if let Some((at, handle)) = &self.cancel_on_call {
            if *at == n {
                handle.cancel();
            }
        }
        if self.fail_on_call == Some(n) {
            return Err(TranslationError::Backend {
                status: Some(500),
                message: "backend exploded".to_string(),
            });
        }

        Ok(ChunkTranslation {
            text: chunk.to_uppercase(),
            detected_source: self.detected.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start { request_id: String, extra_info: String },
    Done { char_count: usize },
    Error(String),
    Cancel(String),
}

/// 记录所有进度事件
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn start(&self, request_id: &str, _service: &str, extra_info: &str) {
        self.events.lock().unwrap().push(ProgressEvent::Start {
            request_id: request_id.to_string(),
            extra_info: extra_info.to_string(),
        });
    }

    fn done(&self, _request_id: &str, _service: &str, char_count: usize, _elapsed_ms: u64) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Done { char_count });
    }

    fn error(&self, _request_id: &str, _service: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Error(message.to_string()));
    }

    fn cancel(&self, _request_id: &str, _service: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Cancel(message.to_string()));
    }
}

/// 每个回调都 panic 的 sink
pub struct PanickingProgress;

impl ProgressSink for PanickingProgress {
    fn start(&self, _request_id: &str, _service: &str, _extra_info: &str) {
        panic!("progress start");
    }

    fn done(&self, _request_id: &str, _service: &str, _char_count: usize, _elapsed_ms: u64) {
        panic!("progress done");
    }

    fn error(&self, _request_id: &str, _service: &str, _message: &str) {
        panic!("progress error");
    }

    fn cancel(&self, _request_id: &str, _service: &str, _message: &str) {
        panic!("progress cancel");
    }
}

/// 服务端收到的一次请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// 按顺序返回预设响应的本地 HTTP 服务，预设用完后重复最后一个
pub struct ScriptedServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedServer {
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let mut responses: VecDeque<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let (status, body) = if responses.len() > 1 {
                    responses.pop_front().unwrap()
                } else {
                    responses.front().cloned().unwrap_or((500, String::new()))
                };

                if let Some(request) = read_request(&mut socket).await {
                    recorded.lock().unwrap().push(request);
                }

                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    if status < 400 { "OK" } else { "Error" },
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            url: format!("http://{}/language/translate/v2", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }

    let body_end = std::cmp::min(buf.len(), body_start + content_length);
    Some(RecordedRequest {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[body_start..body_end]).to_string(),
    })
}

/// 返回一个当前没有监听的本地地址
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/language/translate/v2", addr)
}
