// YouTube and MTurk clients against a local HTTP stub

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use vid_annotate::mturk::rest::MTurkRest;
    use vid_annotate::mturk::types::TaskRequest;
    use vid_annotate::mturk::{Endpoint, Marketplace};
    use vid_annotate::youtube::rest::YouTubeRest;
    use vid_annotate::youtube::VideoPlatform;

    #[derive(Debug, Clone)]
    struct Request {
        method: String,
        target: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl Request {
        fn path(&self) -> &str {
            self.target.split('?').next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap_or(Value::Null)
        }

        fn line(&self) -> String {
            format!("{} {}", self.method, self.path())
        }
    }

    struct Reply {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Reply {
        fn json(body: Value) -> Self {
            Self {
                status: 200,
                headers: Vec::new(),
                body: body.to_string(),
            }
        }
    }

    type Handler = Arc<dyn Fn(&Request, &str) -> Reply + Send + Sync>;

    /// Start a one-request-per-connection HTTP server. Returns its base URL and
    /// the log of requests it has seen.
    async fn serve(handler: Handler) -> (String, Arc<Mutex<Vec<Request>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let log = Arc::new(Mutex::new(Vec::new()));

        let accept_log = log.clone();
        let accept_base = base.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = accept_log.clone();
                let handler = handler.clone();
                let base = accept_base.clone();
                tokio::spawn(async move {
                    handle(stream, &base, handler, log).await;
                });
            }
        });
        (base, log)
    }

    async fn handle(mut stream: TcpStream, base: &str, handler: Handler, log: Arc<Mutex<Vec<Request>>>) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        let header_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split(' ');
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let mut request = Request {
            method,
            target,
            headers,
            body: Vec::new(),
        };
        let mut body = buf[header_end + 4..].to_vec();
        if request
            .header("transfer-encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
        {
            while find(&body, b"0\r\n\r\n").is_none() {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..n]);
            }
            request.body = dechunk(&body);
        } else {
            let len: usize = request
                .header("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            while body.len() < len {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..n]);
            }
            request.body = body;
        }

        let reply = (*handler)(&request, base);
        log.lock().unwrap().push(request);

        let mut response = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
            reply.status,
            reply.body.len()
        );
        for (k, v) in &reply.headers {
            response.push_str(&format!("{}: {}\r\n", k, v));
        }
        response.push_str("\r\n");
        response.push_str(&reply.body);
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn dechunk(mut data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(line_end) = find(data, b"\r\n") {
            let size = usize::from_str_radix(std::str::from_utf8(&data[..line_end]).unwrap().trim(), 16).unwrap();
            if size == 0 {
                break;
            }
            let start = line_end + 2;
            out.extend_from_slice(&data[start..start + size]);
            data = &data[start + size + 2..];
        }
        out
    }

    // --- YouTube ---

    fn youtube_handler(existing: Option<&'static str>) -> Handler {
        Arc::new(move |req: &Request, base: &str| match (req.method.as_str(), req.path()) {
            ("GET", "/youtube/v3/playlists") => Reply::json(match existing {
                Some(title) => json!({
                    "items": [{"id": "PL1", "snippet": {"title": title, "description": ""}}]
                }),
                None => json!({"items": []}),
            }),
            ("GET", "/youtube/v3/playlistItems") => Reply::json(json!({"items": []})),
            ("POST", "/youtube/v3/playlists") => {
                let title = req.json()["snippet"]["title"].as_str().unwrap_or_default().to_string();
                Reply::json(json!({"id": "PLnew", "snippet": {"title": title, "description": ""}}))
            }
            ("POST", "/upload/youtube/v3/videos") => {
                let title = req.json()["snippet"]["title"].as_str().unwrap_or_default().to_string();
                Reply {
                    status: 200,
                    headers: vec![("Location".to_string(), format!("{}/session/{}", base, title))],
                    body: "{}".to_string(),
                }
            }
            ("PUT", path) if path.starts_with("/session/") => {
                Reply::json(json!({"id": format!("id-{}", &path["/session/".len()..])}))
            }
            ("POST", "/youtube/v3/playlistItems") => Reply::json(json!({})),
            _ => Reply {
                status: 404,
                headers: Vec::new(),
                body: "{}".to_string(),
            },
        })
    }

    fn youtube(base: &str, token: Option<&str>) -> YouTubeRest {
        YouTubeRest::with_base_urls(
            token.map(str::to_string),
            &format!("{}/youtube/v3", base),
            &format!("{}/upload/youtube/v3", base),
        )
        .unwrap()
    }

    fn video_dir(files: &[(&str, &[u8])]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in files {
            std::fs::write(dir.path().join(name), bytes).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_upload_creates_missing_playlist_then_uploads_and_inserts() {
        let (base, log) = serve(youtube_handler(None)).await;
        let client = youtube(&base, Some("tok"));
        let dir = video_dir(&[("a.mp4", b"first video"), ("b.MOV", b"second"), ("notes.txt", b"x")]);

        let uploaded = client.upload_directory(dir.path(), "Trials").await.unwrap();
        let ids: Vec<&str> = uploaded.iter().map(|u| u.video_id.as_str()).collect();
        assert_eq!(ids, vec!["id-a", "id-b"]);
        assert_eq!(uploaded[0].file_name, "a.mp4");

        let log = log.lock().unwrap();
        let lines: Vec<String> = log.iter().map(Request::line).collect();
        assert_eq!(
            lines,
            vec![
                "GET /youtube/v3/playlists",
                "POST /youtube/v3/playlists",
                "POST /upload/youtube/v3/videos",
                "PUT /session/a",
                "POST /youtube/v3/playlistItems",
                "POST /upload/youtube/v3/videos",
                "PUT /session/b",
                "POST /youtube/v3/playlistItems",
            ]
        );

        assert_eq!(log[1].json()["snippet"]["title"], "Trials");
        assert_eq!(log[1].json()["status"]["privacyStatus"], "unlisted");
        assert_eq!(log[2].header("x-upload-content-length"), Some("11"));
        assert_eq!(log[2].json()["snippet"]["categoryId"], "27");
        assert_eq!(log[3].body, b"first video");
        assert_eq!(log[4].json()["snippet"]["playlistId"], "PLnew");
        assert_eq!(log[4].json()["snippet"]["resourceId"]["videoId"], "id-a");
        assert_eq!(log[7].json()["snippet"]["resourceId"]["videoId"], "id-b");
        assert!(log.iter().all(|r| r.header("authorization") == Some("Bearer tok")));
    }

    #[tokio::test]
    async fn test_upload_reuses_existing_playlist() {
        let (base, log) = serve(youtube_handler(Some("Trials"))).await;
        let client = youtube(&base, Some("tok"));
        let dir = video_dir(&[("a.mp4", b"clip")]);

        client.upload_directory(dir.path(), "Trials").await.unwrap();

        let log = log.lock().unwrap();
        assert!(!log.iter().any(|r| r.line() == "POST /youtube/v3/playlists"));
        let insert = log
            .iter()
            .find(|r| r.line() == "POST /youtube/v3/playlistItems")
            .unwrap();
        assert_eq!(insert.json()["snippet"]["playlistId"], "PL1");
    }

    #[tokio::test]
    async fn test_upload_without_video_files_makes_no_calls() {
        let (base, log) = serve(youtube_handler(None)).await;
        let client = youtube(&base, Some("tok"));
        let dir = video_dir(&[("notes.txt", b"x"), ("cover.png", b"y")]);

        let uploaded = client.upload_directory(dir.path(), "Trials").await.unwrap();
        assert!(uploaded.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_any_request() {
        let (base, log) = serve(youtube_handler(None)).await;
        let client = youtube(&base, None);
        assert!(!client.is_signed_in());

        let err = client.list_playlists().await.unwrap_err();
        assert!(err.to_string().contains("YOUTUBE_ACCESS_TOKEN"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_is_asked_for_once() {
        let (base, log) = serve(youtube_handler(Some("Trials"))).await;
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let client = youtube(&base, None).with_token_prompt(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("typed".to_string())
        });

        client.list_playlists().await.unwrap();
        client.list_playlists().await.unwrap();

        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert!(client.is_signed_in());
        assert!(log
            .lock()
            .unwrap()
            .iter()
            .all(|r| r.header("authorization") == Some("Bearer typed")));
    }

    // --- MTurk ---

    const ANSWER_XML: &str = "<QuestionFormAnswers><Answer><QuestionIdentifier>taskAnswers</QuestionIdentifier>\
        <FreeText>[{&quot;video_0_efficiency&quot;:&quot;4&quot;}]</FreeText></Answer></QuestionFormAnswers>";

    fn mturk_handler() -> Handler {
        Arc::new(|req: &Request, _base: &str| {
            let body = req.json();
            match req.header("x-amz-target").unwrap_or_default() {
                "MTurkRequesterServiceV20170117.ListHITs" => Reply::json(match body.get("NextToken") {
                    None => json!({
                        "HITs": [{
                            "HITId": "H1", "HITGroupId": "G1", "Title": "Rate videos",
                            "HITStatus": "Assignable", "NumberOfAssignmentsAvailable": 2,
                            "CreationTime": 1_710_000_000.0
                        }],
                        "NextToken": "page2"
                    }),
                    Some(_) => json!({"HITs": [{"HITId": "H2", "HITGroupId": "G2"}]}),
                }),
                "MTurkRequesterServiceV20170117.ListAssignmentsForHIT" => {
                    Reply::json(if body["HITId"] == "H1" {
                        json!({"Assignments": [{"AssignmentId": "A1", "WorkerId": "W1", "Answer": ANSWER_XML}]})
                    } else {
                        json!({"Assignments": []})
                    })
                }
                "MTurkRequesterServiceV20170117.CreateHIT" => {
                    Reply::json(json!({"HIT": {"HITId": "H9", "HITGroupId": "G9"}}))
                }
                _ => Reply {
                    status: 400,
                    headers: Vec::new(),
                    body: json!({"__type": "ValidationException", "Message": "unknown operation"}).to_string(),
                },
            }
        })
    }

    #[tokio::test]
    async fn test_list_tasks_pages_and_attaches_responses() {
        let (base, log) = serve(mturk_handler()).await;
        let client = MTurkRest::with_base_url("AKIDEXAMPLE", "secret", &base).unwrap();

        let tasks = client.list_tasks(Endpoint::Sandbox).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "H1");
        assert_eq!(tasks[0].assignments_available, 2);
        assert_eq!(tasks[0].created.as_deref(), Some("2024-03-09T16:00:00+00:00"));
        assert_eq!(tasks[0].responses.len(), 1);
        assert_eq!(tasks[0].responses[0].worker_id, "W1");
        assert_eq!(tasks[0].responses[0].answers["video_0_efficiency"], "4");
        assert_eq!(tasks[1].id, "H2");
        assert!(tasks[1].responses.is_empty());

        let log = log.lock().unwrap();
        let targets: Vec<&str> = log.iter().map(|r| r.header("x-amz-target").unwrap_or_default()).collect();
        assert_eq!(
            targets,
            vec![
                "MTurkRequesterServiceV20170117.ListHITs",
                "MTurkRequesterServiceV20170117.ListHITs",
                "MTurkRequesterServiceV20170117.ListAssignmentsForHIT",
                "MTurkRequesterServiceV20170117.ListAssignmentsForHIT",
            ]
        );
        assert_eq!(log[1].json()["NextToken"], "page2");
        assert_eq!(log[2].json()["AssignmentStatuses"], json!(["Submitted"]));
        let auth = log[0].header("authorization").unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(auth.contains("/us-east-1/mturk-requester/aws4_request"));
        assert_eq!(log[0].header("content-type"), Some("application/x-amz-json-1.1"));
        // The signature covers the host:port the request actually went to.
        assert_eq!(log[0].header("host"), base.strip_prefix("http://"));
    }

    #[tokio::test]
    async fn test_create_task_sends_formatted_reward() {
        let (base, log) = serve(mturk_handler()).await;
        let client = MTurkRest::with_base_url("AKIDEXAMPLE", "secret", &base).unwrap();
        let request = TaskRequest {
            title: "Rate videos".to_string(),
            description: "Watch and rate".to_string(),
            keywords: "video".to_string(),
            reward: 0.5,
            max_assignments: 3,
            lifetime_seconds: 604_800,
            assignment_duration_seconds: 3600,
            auto_approval_seconds: 259_200,
            question: "<HTMLQuestion/>".to_string(),
        };

        let created = client.create_task(Endpoint::Production, &request).await.unwrap();
        assert_eq!(created.hit_id, "H9");
        assert_eq!(created.preview_url, "https://worker.mturk.com/mturk/preview?groupId=G9");

        let body = log.lock().unwrap()[0].json();
        assert_eq!(body["Reward"], "0.50");
        assert_eq!(body["MaxAssignments"], 3);
        assert_eq!(body["AutoApprovalDelayInSeconds"], 259_200);
        assert_eq!(body["Question"], "<HTMLQuestion/>");
    }

    #[tokio::test]
    async fn test_api_error_carries_type_and_message() {
        let (base, _log) = serve(Arc::new(|_: &Request, _: &str| Reply {
            status: 400,
            headers: Vec::new(),
            body: json!({"__type": "ServiceFault", "Message": "try again"}).to_string(),
        }))
        .await;
        let client = MTurkRest::with_base_url("AKIDEXAMPLE", "secret", &base).unwrap();

        let err = client.fetch_responses(Endpoint::Sandbox, "H1").await.unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.contains("ServiceFault: try again"));
        assert!(text.contains("sandbox"));
    }
}
