// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Time related utils.

/// Alias for the UTC datetime used across this crate.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Format a datetime as an RFC 1123 HTTP date: `Thu, 05 Jun 2008 16:38:19 GMT`.
///
/// This is the format the date-bound header schemes place in the date slot.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
