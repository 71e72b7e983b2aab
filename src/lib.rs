//!Minimal HTTP checker built on a raw TCP socket.
//!
//!The request line and headers are written by hand, sent over a single
//!`TcpStream`, and whatever the server returns before closing the connection
//!is handed back untouched.
//!
//!## Example
//!Basic GET request
//!```no_run
//!use httpcheck::request::RequestBuilder;
//!
//!fn main() -> Result<(), httpcheck::error::Error> {
//!    let request = RequestBuilder::new("example.com").path("/").build()?;
//!    let response = request.send()?;
//!
//!    println!("{}", String::from_utf8_lossy(&response));
//!    Ok(())
//!}
//!```
pub mod cli;
pub mod error;
pub mod request;
pub mod response;
pub mod stream;
