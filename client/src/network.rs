use crate::game::ClientGameState;
use crate::input::{parse_line, to_frame, UserCommand};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientCommand, ServerFrame};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

pub struct Client {
    server_url: String,
    state: ClientGameState,
}

impl Client {
    pub fn new(server_url: &str, nickname: &str) -> Self {
        Client {
            server_url: server_url.to_string(),
            state: ClientGameState::new(nickname),
        }
    }

    pub fn state(&self) -> &ClientGameState {
        &self.state
    }

    /// Plays interactively from stdin until `quit` or the server hangs up
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_with_input(BufReader::new(tokio::io::stdin()))
            .await
    }

    /// Connects, registers the nickname and then relays lines from `input`
    /// to the server while printing every frame that comes back
    pub async fn run_with_input<R>(&mut self, input: R) -> Result<(), Box<dyn std::error::Error>>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Connecting to {}...", self.server_url);
        let (socket, _) = connect_async(self.server_url.as_str()).await?;
        let (mut sink, mut incoming) = socket.split();
        info!("Connected as '{}'", self.state.nickname);

        sink.send(Message::Text(
            ClientCommand::Nickname(&self.state.nickname).encode(),
        ))
        .await?;

        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            tokio::select! {
                frame = incoming.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text),
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Connection error: {}", e);
                            return Err(e.into());
                        }
                    }
                }
                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        debug!("Input closed, still listening for results");
                        input_open = false;
                        continue;
                    };

                    let command = match parse_line(&line) {
                        Ok(Some(command)) => command,
                        Ok(None) => continue,
                        Err(e) => {
                            println!("{}", e);
                            continue;
                        }
                    };

                    match to_frame(&command, &self.state.nickname)? {
                        Some(frame) => {
                            if let UserCommand::Nickname(name) = &command {
                                self.state.nickname = name.clone();
                            }
                            sink.send(Message::Text(frame)).await?;
                        }
                        None => {
                            info!("Leaving the table");
                            sink.send(Message::Close(None)).await?;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_frame(&mut self, text: &str) {
        match ServerFrame::parse(text) {
            Ok(frame) => {
                println!("{}", frame);
                self.state.apply_frame(&frame);
                if matches!(frame, ServerFrame::Winners(_)) {
                    println!("{}", self.state.status_line());
                }
            }
            Err(e) => warn!("Unrecognized frame '{}': {}", text, e),
        }
    }
}
