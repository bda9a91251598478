//! Mock banking API server for testing
//!
//! This module provides a mock HTTP server that simulates the banking API,
//! allowing the reqwest transport and the services to be tested end to end
//! without a real backend.
//!
//! The mock server implements the same response structure as the real API:
//! - POST /register (form) returns { message, user_id }
//! - POST /login (form) returns { access_token, token_type }
//! - GET /balance returns { balance: N }
//! - GET /transactions?page=&limit= returns { transactions: [...] }
//! - POST /transfer?recipient_username=&amount= returns { message }

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rust_decimal::Decimal;
use serde_json::json;

/// Password accepted for every mock user
pub const MOCK_PASSWORD: &str = "secret";

/// Mock banking server for testing
pub struct MockBankServer {
    port: u16,
    running: Arc<AtomicBool>,
    bank: Arc<Mutex<MockBank>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for the mock bank
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Users created up front, each with this starting balance
    pub users: Vec<String>,
    pub starting_balance: Decimal,
    /// Answer GET /balance with HTTP 500
    pub fail_balance: bool,
    /// Answer every request with HTTP 429
    pub rate_limit: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            users: vec!["alice".to_string(), "bob".to_string()],
            starting_balance: Decimal::new(100000, 2),
            fail_balance: false,
            rate_limit: false,
        }
    }
}

#[derive(Debug)]
struct MockTransaction {
    id: u64,
    kind: &'static str,
    amount: Decimal,
    description: String,
}

#[derive(Debug)]
struct MockBank {
    config: MockConfig,
    balances: HashMap<String, Decimal>,
    history: HashMap<String, Vec<MockTransaction>>,
    next_id: u64,
}

impl MockBank {
    fn new(config: MockConfig) -> Self {
        let mut bank = Self {
            balances: HashMap::new(),
            history: HashMap::new(),
            next_id: 1,
            config,
        };
        for user in bank.config.users.clone() {
            bank.open_account(&user);
        }
        bank
    }

    fn open_account(&mut self, user: &str) {
        self.balances.insert(user.to_string(), self.config.starting_balance);
        self.history.insert(user.to_string(), Vec::new());
    }

    fn record(&mut self, user: &str, kind: &'static str, amount: Decimal, description: String) {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(history) = self.history.get_mut(user) {
            history.push(MockTransaction {
                id,
                kind,
                amount,
                description,
            });
        }
    }
}

/// A parsed request
struct Request {
    method: String,
    path: String,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
    bearer: Option<String>,
}

impl MockBankServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let bank = Arc::new(Mutex::new(MockBank::new(config)));
        let bank_clone = bank.clone();

        // Set listener to non-blocking for graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let bank = bank_clone.clone();
                        thread::spawn(move || handle_connection(stream, &bank));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            bank,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Current balance of a user, for assertions
    pub fn balance_of(&self, user: &str) -> Option<Decimal> {
        let bank = self.bank.lock().unwrap_or_else(|e| e.into_inner());
        bank.balances.get(user).copied()
    }

    /// Add a deposit to a user's history and balance
    pub fn deposit(&self, user: &str, amount: Decimal, description: &str) {
        let mut bank = self.bank.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(balance) = bank.balances.get_mut(user) {
            *balance += amount;
        }
        bank.record(user, "deposit", amount, description.to_string());
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBankServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn mock_token(user: &str) -> String {
    format!("tok-{}", user)
}

fn user_from_token(token: &str) -> Option<&str> {
    token.strip_prefix("tok-")
}

fn parse_pairs(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    stream.set_nonblocking(false).ok()?;

    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    // Read until the end of the headers
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let first_line = lines.next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut bearer = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            } else if name == "authorization" {
                bearer = value.strip_prefix("Bearer ").map(str::to_string);
            }
        }
    }

    // Read the rest of the body
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), parse_pairs(query)),
        None => (target, HashMap::new()),
    };

    Some(Request {
        method,
        path,
        query,
        form: parse_pairs(&body),
        bearer,
    })
}

fn handle_connection(mut stream: TcpStream, bank: &Mutex<MockBank>) {
    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    };

    let mut bank = bank.lock().unwrap_or_else(|e| e.into_inner());
    let (status, body) = route(&mut bank, &request);
    drop(bank);

    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        _ => "Internal Server Error",
    };
    send_response(&mut stream, status, status_text, &body);
}

fn route(bank: &mut MockBank, request: &Request) -> (u16, String) {
    if bank.config.rate_limit {
        return (429, json!({"error": "Rate limit exceeded: 5 per 1 minute"}).to_string());
    }

    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/register") => register(bank, request),
        ("POST", "/login") => login(bank, request),
        ("GET", "/balance") => with_user(bank, request, balance),
        ("GET", "/transactions") => with_user(bank, request, transactions),
        ("POST", "/transfer") => with_user(bank, request, transfer),
        _ => (404, json!({"detail": "Not Found"}).to_string()),
    }
}

fn register(bank: &mut MockBank, request: &Request) -> (u16, String) {
    let username = request.form.get("username").cloned().unwrap_or_default();
    if username.is_empty() || !request.form.contains_key("email") {
        return (422, json!({"detail": [{"msg": "field required"}]}).to_string());
    }
    if bank.balances.contains_key(&username) {
        return (400, json!({"detail": "Username or email already exists"}).to_string());
    }
    bank.open_account(&username);
    let user_id = bank.balances.len();
    (200, json!({"message": "Registration successful", "user_id": user_id}).to_string())
}

fn login(bank: &mut MockBank, request: &Request) -> (u16, String) {
    let username = request.form.get("username").map(String::as_str).unwrap_or("");
    let password = request.form.get("password").map(String::as_str).unwrap_or("");
    if !bank.balances.contains_key(username) || password != MOCK_PASSWORD {
        return (401, json!({"detail": "Invalid credentials"}).to_string());
    }
    (200, json!({"access_token": mock_token(username), "token_type": "bearer"}).to_string())
}

fn with_user(
    bank: &mut MockBank,
    request: &Request,
    handler: fn(&mut MockBank, &Request, &str) -> (u16, String),
) -> (u16, String) {
    let user = request
        .bearer
        .as_deref()
        .and_then(user_from_token)
        .filter(|user| bank.balances.contains_key(*user))
        .map(str::to_string);

    match user {
        Some(user) => handler(bank, request, &user),
        None => (401, json!({"detail": "Invalid token"}).to_string()),
    }
}

fn balance(bank: &mut MockBank, _request: &Request, user: &str) -> (u16, String) {
    if bank.config.fail_balance {
        return (500, "Internal Server Error".to_string());
    }
    let balance = bank.balances.get(user).copied().unwrap_or_default();
    (200, format!(r#"{{"balance": {}}}"#, balance))
}

fn transactions(bank: &mut MockBank, request: &Request, user: &str) -> (u16, String) {
    let page: usize = request.query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = request.query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let offset = page.saturating_sub(1) * limit;

    let history = bank.history.get(user).map(Vec::as_slice).unwrap_or(&[]);
    let items: Vec<_> = history
        .iter()
        .rev()
        .skip(offset)
        .take(limit)
        .map(|tx| {
            json!({
                "id": tx.id,
                "transaction_type": tx.kind,
                "amount": tx.amount.to_string().parse::<f64>().unwrap_or(0.0),
                "transaction_date": "2024-01-01T00:00:00",
                "description": tx.description,
            })
        })
        .collect();

    (200, json!({"transactions": items}).to_string())
}

fn transfer(bank: &mut MockBank, request: &Request, user: &str) -> (u16, String) {
    let recipient = request.query.get("recipient_username").cloned().unwrap_or_default();
    let amount: Decimal = match request.query.get("amount").and_then(|a| a.parse().ok()) {
        Some(amount) => amount,
        None => return (422, json!({"detail": [{"msg": "value is not a valid float"}]}).to_string()),
    };

    if amount <= Decimal::ZERO {
        return (400, json!({"detail": "Invalid amount"}).to_string());
    }
    let sender_balance = bank.balances.get(user).copied().unwrap_or_default();
    if sender_balance < amount {
        return (400, json!({"detail": "Insufficient funds"}).to_string());
    }
    if !bank.balances.contains_key(&recipient) {
        return (404, json!({"detail": "Recipient not found"}).to_string());
    }
    if recipient == user {
        return (400, json!({"detail": "You cannot transfer money to yourself."}).to_string());
    }

    if let Some(balance) = bank.balances.get_mut(user) {
        *balance -= amount;
    }
    if let Some(balance) = bank.balances.get_mut(&recipient) {
        *balance += amount;
    }
    bank.record(user, "transfer", amount, format!("Transfer to {}", recipient));
    bank.record(&recipient, "transfer", amount, format!("Transfer from {}", user));

    (200, json!({"message": "Transfer successful"}).to_string())
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::adapters::{MemoryCredentialStore, ReqwestTransport};
    use crate::domain::result::{Error, ErrorKind};
    use crate::domain::SliceState;
    use crate::ports::CredentialStore;
    use crate::services::{AccountService, AuthService, Gateway, TransferWorkflow};

    struct Client {
        store: Arc<MemoryCredentialStore>,
        accounts: Arc<AccountService>,
        auth: AuthService,
        transfers: TransferWorkflow,
    }

    fn client_for(server: &MockBankServer) -> Client {
        let store = Arc::new(MemoryCredentialStore::new());
        let transport = Arc::new(ReqwestTransport::new(Some(Duration::from_secs(10))).unwrap());
        let gateway = Arc::new(Gateway::new(&server.base_url(), store.clone(), transport).unwrap());
        let accounts = Arc::new(AccountService::new(gateway.clone(), 10));
        let auth = AuthService::new(gateway.clone(), store.clone(), accounts.clone());
        let transfers = TransferWorkflow::new(gateway, accounts.clone());
        Client {
            store,
            accounts,
            auth,
            transfers,
        }
    }

    #[tokio::test]
    async fn test_login_and_dashboard() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        server.deposit("alice", Decimal::new(5000, 2), "payroll");
        let client = client_for(&server);

        client.auth.login("alice", MOCK_PASSWORD).await.unwrap();
        assert_eq!(client.store.get().unwrap().as_deref(), Some("tok-alice"));

        client.accounts.refresh_all().await;

        assert_eq!(
            client.accounts.balance().state(),
            SliceState::Loaded(Decimal::new(105000, 2))
        );
        let page = client.accounts.transactions().state().loaded().cloned().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.transactions[0].description_or_empty(), "payroll");
    }

    #[tokio::test]
    async fn test_bad_password_reports_server_detail() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);

        let err = client.auth.login("alice", "wrong").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service { status: 401 });
        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(client.store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);

        let response = client
            .auth
            .register("carol", "carol@example.com", MOCK_PASSWORD)
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("Registration successful"));

        let err = client
            .auth
            .register("carol", "carol@example.com", MOCK_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Username or email already exists");

        client.auth.login("carol", MOCK_PASSWORD).await.unwrap();
        assert!(client.auth.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_transfer_moves_money_and_refreshes() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);
        client.auth.login("alice", MOCK_PASSWORD).await.unwrap();
        client.accounts.refresh_all().await;

        let receipt = client.transfers.submit("bob", "25").await.unwrap();
        assert_eq!(receipt.message, "Transfer successful");

        assert_eq!(server.balance_of("alice"), Some(Decimal::new(97500, 2)));
        assert_eq!(server.balance_of("bob"), Some(Decimal::new(102500, 2)));

        // Refreshed from the server, not patched locally
        assert_eq!(
            client.accounts.balance().state(),
            SliceState::Loaded(Decimal::new(97500, 2))
        );
        let page = client.accounts.transactions().state().loaded().cloned().unwrap();
        assert_eq!(page.transactions[0].description_or_empty(), "Transfer to bob");
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);
        client.auth.login("alice", MOCK_PASSWORD).await.unwrap();

        let err = client.transfers.submit("bob", "5000").await.unwrap_err();
        assert_eq!(err.user_message(), "Insufficient funds");
        assert_eq!(server.balance_of("alice"), Some(Decimal::new(100000, 2)));
    }

    #[tokio::test]
    async fn test_balance_failure_independent_of_transactions() {
        let server = MockBankServer::start(MockConfig {
            fail_balance: true,
            ..Default::default()
        })
        .unwrap();
        let client = client_for(&server);
        client.auth.login("alice", MOCK_PASSWORD).await.unwrap();

        client.accounts.refresh_all().await;

        let failure = client.accounts.balance().state().failure().cloned().unwrap();
        assert_eq!(failure.kind, ErrorKind::Service { status: 500 });
        assert!(client.accounts.transactions().state().loaded().is_some());
    }

    #[tokio::test]
    async fn test_expired_token_keeps_credential() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);
        client.store.set("tok-nobody").unwrap();

        let state = client.accounts.fetch_balance().await;
        assert_eq!(state.failure().unwrap().message, "Invalid token");
        assert_eq!(client.store.get().unwrap().as_deref(), Some("tok-nobody"));
    }

    #[tokio::test]
    async fn test_rate_limit_message() {
        let server = MockBankServer::start(MockConfig {
            rate_limit: true,
            ..Default::default()
        })
        .unwrap();
        let client = client_for(&server);

        let err = client.auth.login("alice", MOCK_PASSWORD).await.unwrap_err();
        match err {
            Error::Service { status, message, .. } => {
                assert_eq!(status, 429);
                assert!(message.contains("Rate limit exceeded"));
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }
}
