//! Inline HTML echo test page served at `/`.

use axum::response::Html;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Gravity Sling</title>
</head>
<body>
    <h1>Welcome to Gravity Sling Multiplayer!</h1>
    <input id="msg" type="text" placeholder="Type a message and press Enter" autofocus />
    <pre id="log"></pre>
    <script>
        const ws = new WebSocket("ws://" + location.host + "/ws");
        const log = document.getElementById("log");
        ws.onopen = () => log.textContent += "WebSocket connected!\n";
        ws.onerror = (err) => log.textContent += "WebSocket error: " + err.message + "\n";
        ws.onclose = () => log.textContent += "WebSocket connection closed\n";
        ws.onmessage = (event) => log.textContent += event.data + "\n";
        document.getElementById("msg").addEventListener("keydown", (event) => {
            if (event.key === "Enter" && event.target.value) {
                ws.send(event.target.value);
                event.target.value = "";
            }
        });
    </script>
</body>
</html>
"#;

/// `GET /` — static test page that opens a WebSocket to `/ws` and logs
/// everything it receives.
pub async fn home_page() -> Html<&'static str> {
    Html(HOME_PAGE)
}
